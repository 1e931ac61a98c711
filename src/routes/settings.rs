use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::config_dto::{ConfigQuery, ConfigResponse, TestConnectionPayload, UpdateConfigPayload},
    error::{Error, Result},
    services::config_service::MASKED_TOKEN,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/config",
    params(
        ("secret" = Option<bool>, Query, description = "Return the raw token instead of the mask")
    ),
    responses(
        (status = 200, description = "Stored bot configuration", body = Json<ConfigResponse>)
    )
)]
#[axum::debug_handler]
pub async fn get_settings(
    State(state): State<AppState>,
    Query(query): Query<ConfigQuery>,
) -> Result<impl IntoResponse> {
    let stored = state.config_service.get().await?;
    let reveal = query.secret.unwrap_or(false);

    let token = stored.as_ref().and_then(|c| c.telegram_bot_token.clone());
    let has_token = token.is_some();
    let telegram_bot_token = match (token, reveal) {
        (Some(token), true) => Some(token),
        (Some(_), false) => Some(MASKED_TOKEN.to_string()),
        (None, _) => None,
    };

    Ok(Json(ConfigResponse {
        telegram_bot_token,
        telegram_channel_id: stored.and_then(|c| c.telegram_channel_id),
        has_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/config",
    request_body = UpdateConfigPayload,
    responses(
        (status = 200, description = "Configuration updated", body = Json<ConfigResponse>),
        (status = 400, description = "Nothing to update")
    )
)]
#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateConfigPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.telegram_bot_token.is_none() && payload.telegram_channel_id.is_none() {
        return Err(Error::BadRequest(
            "Provide telegram_bot_token or telegram_channel_id".to_string(),
        ));
    }

    // Settings forms echo the mask back; that means "keep the stored token".
    let token = payload
        .telegram_bot_token
        .as_deref()
        .filter(|t| *t != MASKED_TOKEN);
    let updated = state
        .config_service
        .upsert(token, payload.telegram_channel_id.as_deref())
        .await?;

    Ok(Json(ConfigResponse {
        telegram_bot_token: updated
            .telegram_bot_token
            .as_ref()
            .map(|_| MASKED_TOKEN.to_string()),
        has_token: updated.telegram_bot_token.is_some(),
        telegram_channel_id: updated.telegram_channel_id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/test-telegram",
    request_body = TestConnectionPayload,
    responses(
        (status = 200, description = "Connection test outcome"),
        (status = 400, description = "No bot token available")
    )
)]
#[axum::debug_handler]
pub async fn test_telegram(
    State(state): State<AppState>,
    payload: Option<Json<TestConnectionPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let override_token = payload
        .bot_token
        .as_deref()
        .filter(|t| !t.trim().is_empty() && *t != MASKED_TOKEN);
    let override_chat = payload.chat_id.as_deref().filter(|c| !c.trim().is_empty());

    let credentials = state
        .config_service
        .resolve_credentials(override_token, override_chat)
        .await?;

    let me = match state.bot.get_me(&credentials.bot_token).await {
        Ok(me) => me,
        Err(err) => {
            return Ok(Json(json!({
                "success": false,
                "message": error_text(err),
            })));
        }
    };
    let bot_username = me
        .get("username")
        .and_then(|u| u.as_str())
        .unwrap_or("unknown")
        .to_string();

    match state
        .bot
        .get_chat(&credentials.bot_token, &credentials.channel_id)
        .await
    {
        Ok(chat) => {
            let title = chat
                .get("title")
                .and_then(|t| t.as_str())
                .or_else(|| chat.get("username").and_then(|u| u.as_str()))
                .unwrap_or(credentials.channel_id.as_str());
            Ok(Json(json!({
                "success": true,
                "message": format!("Connected as @{}. Channel: {}", bot_username, title),
            })))
        }
        Err(err) => Ok(Json(json!({
            "success": false,
            "message": format!(
                "Bot @{} is valid, but the channel is unreachable: {}",
                bot_username,
                error_text(err)
            ),
        }))),
    }
}

fn error_text(err: Error) -> String {
    match err {
        Error::BadRequest(msg) => msg,
        other => other.to_string(),
    }
}
