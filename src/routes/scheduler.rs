use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::scheduler_dto::{DispatchPayload, DispatchResponse, DispatchSelectedPayload},
    error::{Error, Result},
    routes::cron::verify_cron_secret,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/scheduler",
    request_body = DispatchPayload,
    responses(
        (status = 200, description = "Dispatch outcome, or a no-op message when nothing is pending"),
        (status = 401, description = "Cron secret mismatch")
    )
)]
#[axum::debug_handler]
pub async fn dispatch_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<DispatchPayload>>,
) -> Result<Response> {
    verify_cron_secret(&headers, None)?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let outcome = state
        .dispatch_service
        .dispatch(
            None,
            payload.bot_token.as_deref(),
            payload.channel_id.as_deref(),
        )
        .await?;

    if outcome.results.is_empty() {
        return Ok(Json(json!({ "message": "No pending posts to send" })).into_response());
    }
    Ok(Json(DispatchResponse::from(outcome)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scheduler/selected",
    request_body = DispatchSelectedPayload,
    responses(
        (status = 200, description = "Dispatch outcome for the selected posts"),
        (status = 400, description = "Empty selection, or nothing in it is pending"),
        (status = 401, description = "Cron secret mismatch")
    )
)]
#[axum::debug_handler]
pub async fn dispatch_selected(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DispatchSelectedPayload>,
) -> Result<Response> {
    verify_cron_secret(&headers, None)?;
    payload.validate()?;

    let outcome = state
        .dispatch_service
        .dispatch(
            Some(&payload.ids),
            payload.bot_token.as_deref(),
            payload.channel_id.as_deref(),
        )
        .await?;

    if outcome.results.is_empty() {
        return Err(Error::BadRequest(
            "None of the selected posts are pending".to_string(),
        ));
    }
    Ok(Json(DispatchResponse::from(outcome)).into_response())
}
