use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::caption_dto::CaptionRequest,
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/caption",
    request_body = CaptionRequest,
    responses(
        (status = 200, description = "Caption set for the image", body = Json<CaptionResponse>),
        (status = 400, description = "Missing or invalid image URL")
    )
)]
#[axum::debug_handler]
pub async fn generate_caption(
    State(state): State<AppState>,
    Json(payload): Json<CaptionRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.caption_service.generate(&payload).await?;
    Ok(Json(response))
}
