use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateConfigPayload {
    #[validate(length(min = 1))]
    pub telegram_bot_token: Option<String>,
    #[validate(length(min = 1))]
    pub telegram_channel_id: Option<String>,
}

/// What GET /api/config reports. The token is masked unless the caller asked
/// for the raw value with `?secret=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub telegram_bot_token: Option<String>,
    pub telegram_channel_id: Option<String>,
    pub has_token: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigQuery {
    pub secret: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConnectionPayload {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}
