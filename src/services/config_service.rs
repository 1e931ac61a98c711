use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::bot_config::BotConfig;

/// What a stored token looks like when echoed back to the dashboard.
pub const MASKED_TOKEN: &str = "••••••••••••••••••••••••••";

/// Channel the very first deployment shipped with, kept as the last resort so
/// a fresh install can post before anyone opens the settings page.
pub const DEFAULT_CHANNEL_ID: &str = "5987629480";

const CONFIG_ROW_ID: &str = "default";

/// Fully resolved credentials for one Telegram call.
#[derive(Debug, Clone)]
pub struct BotCredentials {
    pub bot_token: String,
    pub channel_id: String,
}

#[derive(Clone)]
pub struct ConfigService {
    pool: SqlitePool,
}

impl ConfigService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<Option<BotConfig>> {
        let config = sqlx::query_as::<_, BotConfig>(
            "SELECT id, telegram_bot_token, telegram_channel_id, updated_at \
             FROM bot_config WHERE id = ?",
        )
        .bind(CONFIG_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    /// Partial write: a field left out of the payload keeps its stored value,
    /// so saving a new channel id does not wipe the token.
    pub async fn upsert(
        &self,
        bot_token: Option<&str>,
        channel_id: Option<&str>,
    ) -> Result<BotConfig> {
        let existing = self.get().await?;
        let merged_token = bot_token
            .map(str::to_string)
            .or_else(|| existing.as_ref().and_then(|c| c.telegram_bot_token.clone()));
        let merged_channel = channel_id
            .map(str::to_string)
            .or_else(|| existing.as_ref().and_then(|c| c.telegram_channel_id.clone()));
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO bot_config (id, telegram_bot_token, telegram_channel_id, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 telegram_bot_token = excluded.telegram_bot_token, \
                 telegram_channel_id = excluded.telegram_channel_id, \
                 updated_at = excluded.updated_at",
        )
        .bind(CONFIG_ROW_ID)
        .bind(&merged_token)
        .bind(&merged_channel)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(BotConfig {
            id: CONFIG_ROW_ID.to_string(),
            telegram_bot_token: merged_token,
            telegram_channel_id: merged_channel,
            updated_at: now,
        })
    }

    /// Resolution order: per-request override, stored config, environment.
    /// The channel additionally falls back to [`DEFAULT_CHANNEL_ID`]; a
    /// missing token is a hard error because nothing can be sent without one.
    pub async fn resolve_credentials(
        &self,
        override_token: Option<&str>,
        override_channel: Option<&str>,
    ) -> Result<BotCredentials> {
        let stored = self.get().await?;
        let env = crate::config::get_config();

        let bot_token = override_token
            .map(str::to_string)
            .or_else(|| stored.as_ref().and_then(|c| c.telegram_bot_token.clone()))
            .or_else(|| env.telegram_bot_token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::BadRequest(
                    "Telegram bot token is not configured. Save one in settings or set TELEGRAM_BOT_TOKEN."
                        .to_string(),
                )
            })?;

        let channel_id = override_channel
            .map(str::to_string)
            .or_else(|| stored.as_ref().and_then(|c| c.telegram_channel_id.clone()))
            .or_else(|| env.telegram_channel_id.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL_ID.to_string());

        Ok(BotCredentials {
            bot_token,
            channel_id,
        })
    }
}
