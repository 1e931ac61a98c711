use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

use crate::error::{Error, Result};

/// Telegram caps photo captions at 1024 characters.
const MAX_CAPTION_CHARS: usize = 1024;

/// The Bot API calls the dispatcher needs. Behind a trait so tests can swap
/// in a recording double instead of talking to Telegram.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_photo(
        &self,
        bot_token: &str,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<()>;

    async fn get_me(&self, bot_token: &str) -> Result<JsonValue>;

    async fn get_chat(&self, bot_token: &str, chat_id: &str) -> Result<JsonValue>;
}

#[derive(Clone)]
pub struct TelegramService {
    client: Client,
}

impl TelegramService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn call(&self, bot_token: &str, method: &str, body: JsonValue) -> Result<JsonValue> {
        let url = format!("https://api.telegram.org/bot{}/{}", bot_token, method);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let payload: JsonValue = resp.json().await?;
        if payload.get("ok").and_then(JsonValue::as_bool) == Some(true) {
            Ok(payload.get("result").cloned().unwrap_or(JsonValue::Null))
        } else {
            let description = payload
                .get("description")
                .and_then(JsonValue::as_str)
                .unwrap_or("Telegram returned an unknown error");
            Err(Error::BadRequest(friendly_send_error(description)))
        }
    }
}

#[async_trait]
impl BotApi for TelegramService {
    async fn send_photo(
        &self,
        bot_token: &str,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "parse_mode": "HTML",
        });
        if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
            body["caption"] = json!(clamp_caption(caption));
        }
        self.call(bot_token, "sendPhoto", body).await?;
        Ok(())
    }

    async fn get_me(&self, bot_token: &str) -> Result<JsonValue> {
        self.call(bot_token, "getMe", json!({})).await
    }

    async fn get_chat(&self, bot_token: &str, chat_id: &str) -> Result<JsonValue> {
        self.call(bot_token, "getChat", json!({ "chat_id": chat_id }))
            .await
    }
}

fn clamp_caption(caption: &str) -> String {
    if caption.chars().count() <= MAX_CAPTION_CHARS {
        return caption.to_string();
    }
    let cut: String = caption.chars().take(MAX_CAPTION_CHARS - 3).collect();
    format!("{}...", cut)
}

/// Turns raw Bot API descriptions into messages a dashboard user can act on.
/// Anything unrecognized passes through untouched.
pub fn friendly_send_error(description: &str) -> String {
    let lowered = description.to_lowercase();
    if lowered.contains("chat not found") {
        return "Chat not found. Check the channel ID and make sure the bot is an admin of the channel.".to_string();
    }
    if lowered.contains("bot was blocked") {
        return "The bot was blocked by this chat. Unblock it or pick another channel.".to_string();
    }
    if lowered.contains("unauthorized") {
        return "Invalid bot token. Double-check the token from @BotFather.".to_string();
    }
    if lowered.contains("wrong file identifier") || lowered.contains("failed to get http url content") {
        return "Telegram could not fetch the image. The URL must be public and point straight at an image file.".to_string();
    }
    if lowered.contains("too many requests") {
        return "Telegram rate limit hit. Wait a moment and try again.".to_string();
    }
    description.to_string()
}
