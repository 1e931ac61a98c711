use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{
    config::get_config,
    error::{Error, Result},
    AppState,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CronQuery {
    pub secret: Option<String>,
}

/// Removes everything already sent. Registered for both GET and POST because
/// hosted cron services differ in which one they emit.
#[utoipa::path(
    post,
    path = "/api/cron/cleanup",
    responses(
        (status = 200, description = "Sent posts removed"),
        (status = 401, description = "Cron secret mismatch")
    )
)]
#[axum::debug_handler]
pub async fn cleanup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<serde_json::Value>> {
    verify_cron_secret(&headers, query.secret.as_deref())?;

    let deleted = state.post_service.delete_sent().await?;
    tracing::info!("cron cleanup removed {} sent post(s)", deleted);

    Ok(Json(json!({
        "success": true,
        "deleted_count": deleted,
        "message": format!("Removed {} sent post(s)", deleted),
    })))
}

/// Sends the single oldest pending post. An unconfigured bot or an empty
/// queue is a quiet no-op so external schedulers do not see spurious
/// failures.
#[utoipa::path(
    post,
    path = "/api/cron/daily-post",
    responses(
        (status = 200, description = "Dispatch outcome or a no-op message"),
        (status = 401, description = "Cron secret mismatch")
    )
)]
#[axum::debug_handler]
pub async fn daily_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<serde_json::Value>> {
    verify_cron_secret(&headers, query.secret.as_deref())?;

    match state.dispatch_service.dispatch_next().await {
        Ok(outcome) if outcome.results.is_empty() => {
            Ok(Json(json!({ "message": "No pending posts" })))
        }
        Ok(outcome) => {
            let first = &outcome.results[0];
            if first.ok {
                Ok(Json(json!({
                    "success": true,
                    "posted": outcome.sent,
                    "post_id": first.id,
                })))
            } else {
                Ok(Json(json!({
                    "success": false,
                    "post_id": first.id,
                    "error": first.error,
                })))
            }
        }
        // The only BadRequest on this path is a missing bot token.
        Err(Error::BadRequest(_)) => Ok(Json(json!({ "message": "Telegram is not configured" }))),
        Err(other) => Err(other),
    }
}

/// No gate when CRON_SECRET is unset. When it is set, the secret may arrive
/// as a bearer header or, for cron services that can only hit a URL, as a
/// `?secret=` query parameter.
pub(crate) fn verify_cron_secret(headers: &HeaderMap, query_secret: Option<&str>) -> Result<()> {
    let Some(expected) = get_config().cron_secret.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .or(query_secret);
    let Some(provided) = provided else {
        return Err(Error::Unauthorized("Unauthorized".to_string()));
    };
    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(Error::Unauthorized("Unauthorized".to_string()))
    }
}
