use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::post_dto::{
        BulkDeletePayload, CreatePostPayload, PostListResponse, PostResponse, UpdatePostPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = Json<PostListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let posts = state.post_service.list().await?;
    Ok(Json(PostListResponse::from(posts)))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostPayload,
    responses(
        (status = 201, description = "Post registered as pending", body = Json<PostResponse>),
        (status = 400, description = "Missing or invalid image URL")
    )
)]
#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let post = state
        .post_service
        .create(&payload.image_url, payload.caption.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    request_body = UpdatePostPayload,
    responses(
        (status = 200, description = "Post updated", body = Json<PostResponse>),
        (status = 404, description = "Post not found")
    )
)]
#[axum::debug_handler]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let post = match payload.caption {
        Some(caption) => state.post_service.update_caption(&id, &caption).await?,
        None => state.post_service.get(&id).await?,
    };
    Ok(Json(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Post not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.post_service.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/posts/bulk",
    request_body = BulkDeletePayload,
    responses(
        (status = 200, description = "Matching posts deleted"),
        (status = 400, description = "Empty id list")
    )
)]
#[axum::debug_handler]
pub async fn bulk_delete_posts(
    State(state): State<AppState>,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let deleted = state.post_service.delete_many(&payload.ids).await?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
