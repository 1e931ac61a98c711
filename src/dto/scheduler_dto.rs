use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::dispatch_service::{DispatchOutcome, ItemOutcome};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchPayload {
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchSelectedPayload {
    #[validate(length(min = 1))]
    pub ids: Vec<String>,
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchItemResult {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub posted: usize,
    pub failed: usize,
    pub results: Vec<DispatchItemResult>,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(value: DispatchOutcome) -> Self {
        Self {
            success: true,
            posted: value.sent,
            failed: value.failed,
            results: value.results.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ItemOutcome> for DispatchItemResult {
    fn from(value: ItemOutcome) -> Self {
        Self {
            id: value.id,
            ok: value.ok,
            error: value.error,
        }
    }
}
