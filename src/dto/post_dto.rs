use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::post::{Post, PostStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostPayload {
    #[validate(length(min = 1), url)]
    pub image_url: String,
    #[validate(length(min = 1))]
    pub caption: Option<String>,
}

/// Only the caption is editable after creation; status moves exclusively
/// through dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostPayload {
    #[validate(length(min = 1))]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeletePayload {
    #[validate(length(min = 1))]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub image_url: String,
    pub caption: Option<String>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
}

impl From<Post> for PostResponse {
    fn from(value: Post) -> Self {
        Self {
            id: value.id,
            image_url: value.image_url,
            caption: value.caption,
            status: value.status,
            created_at: value.created_at,
            sent_at: value.sent_at,
        }
    }
}

impl From<Vec<Post>> for PostListResponse {
    fn from(value: Vec<Post>) -> Self {
        let total = value.len() as i64;
        Self {
            posts: value.into_iter().map(Into::into).collect(),
            total,
        }
    }
}
