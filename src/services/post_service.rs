use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::post::{Post, PostStatus};

const POST_COLUMNS: &str = "id, image_url, caption, status, created_at, sent_at";

#[derive(Clone)]
pub struct PostService {
    pool: SqlitePool,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, image_url: &str, caption: Option<&str>) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            image_url: image_url.to_string(),
            caption: caption.map(str::to_string),
            status: PostStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
        };

        sqlx::query(
            "INSERT INTO posts (id, image_url, caption, status, created_at, sent_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.image_url)
        .bind(&post.caption)
        .bind(post.status)
        .bind(post.created_at)
        .bind(post.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    /// Newest first, the order the dashboard shows them in.
    pub async fn list(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn get(&self, id: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    /// Pending posts in submission order, oldest first. With `ids` the result
    /// is restricted to that set; posts that are already sent drop out here,
    /// which is what makes re-dispatching a no-op.
    pub async fn pending(&self, ids: Option<&[String]>) -> Result<Vec<Post>> {
        let posts = match ids {
            None => {
                sqlx::query_as::<_, Post>(&format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE status = ? ORDER BY created_at ASC"
                ))
                .bind(PostStatus::Pending)
                .fetch_all(&self.pool)
                .await?
            }
            Some([]) => Vec::new(),
            Some(ids) => {
                let mut builder = sqlx::QueryBuilder::new(format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE status = "
                ));
                builder.push_bind(PostStatus::Pending);
                builder.push(" AND id IN (");
                let mut separated = builder.separated(", ");
                for id in ids {
                    separated.push_bind(id);
                }
                separated.push_unseparated(")");
                builder.push(" ORDER BY created_at ASC");
                builder
                    .build_query_as::<Post>()
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(posts)
    }

    pub async fn oldest_pending(&self) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE status = ? ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(PostStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    pub async fn update_caption(&self, id: &str, caption: &str) -> Result<Post> {
        let updated = sqlx::query("UPDATE posts SET caption = ? WHERE id = ?")
            .bind(caption)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::NotFound("Post not found".to_string()));
        }
        self.get(id).await
    }

    /// Flips a post to SENT, but only if it is still pending. Returns false
    /// when another dispatcher got there first.
    pub async fn mark_sent(&self, id: &str) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE posts SET status = ?, sent_at = ? WHERE id = ? AND status = ?",
        )
        .bind(PostStatus::Sent)
        .bind(Utc::now())
        .bind(id)
        .bind(PostStatus::Pending)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut builder = sqlx::QueryBuilder::new("DELETE FROM posts WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");
        let deleted = builder.build().execute(&self.pool).await?;
        Ok(deleted.rows_affected())
    }

    /// Removes everything that has already gone out. Pending posts are never
    /// touched by cleanup.
    pub async fn delete_sent(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM posts WHERE status = ?")
            .bind(PostStatus::Sent)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected())
    }
}
