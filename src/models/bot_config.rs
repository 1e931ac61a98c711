use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton credential row for the Telegram bot. Reads take the first row
/// found; writes upsert against it rather than inserting a second one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BotConfig {
    pub id: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_channel_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}
