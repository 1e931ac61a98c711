use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::services::config_service::ConfigService;
use crate::services::post_service::PostService;
use crate::services::telegram_service::BotApi;

/// Gap between consecutive sends. Telegram throttles bots that burst
/// messages into the same chat.
const SEND_PACING: Duration = Duration::from_millis(350);

#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub id: String,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<ItemOutcome>,
}

/// Pushes pending posts to the Telegram channel, oldest first. One bad post
/// does not stop the batch; only unusable credentials do.
#[derive(Clone)]
pub struct DispatchService {
    posts: PostService,
    config: ConfigService,
    bot: Arc<dyn BotApi>,
}

impl DispatchService {
    pub fn new(posts: PostService, config: ConfigService, bot: Arc<dyn BotApi>) -> Self {
        Self { posts, config, bot }
    }

    /// `ids: None` dispatches every pending post. With ids, only those of
    /// them that are still pending go out, so repeating a dispatch never
    /// re-sends anything.
    pub async fn dispatch(
        &self,
        ids: Option<&[String]>,
        override_token: Option<&str>,
        override_channel: Option<&str>,
    ) -> Result<DispatchOutcome> {
        let credentials = self
            .config
            .resolve_credentials(override_token, override_channel)
            .await?;

        let pending = self.posts.pending(ids).await?;
        if pending.is_empty() {
            return Ok(DispatchOutcome::default());
        }

        tracing::info!("dispatching {} pending post(s)", pending.len());
        let mut results = Vec::with_capacity(pending.len());

        for (index, post) in pending.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(SEND_PACING).await;
            }

            let send = self
                .bot
                .send_photo(
                    &credentials.bot_token,
                    &credentials.channel_id,
                    &post.image_url,
                    post.caption.as_deref(),
                )
                .await;

            match send {
                Ok(()) => {
                    let marked = self.posts.mark_sent(&post.id).await?;
                    if !marked {
                        tracing::warn!("post {} was already marked sent", post.id);
                    }
                    results.push(ItemOutcome {
                        id: post.id.clone(),
                        ok: true,
                        error: None,
                    });
                }
                Err(err) => {
                    let message = match err {
                        Error::BadRequest(msg) => msg,
                        other => other.to_string(),
                    };
                    tracing::warn!("failed to send post {}: {}", post.id, message);
                    results.push(ItemOutcome {
                        id: post.id.clone(),
                        ok: false,
                        error: Some(message),
                    });
                }
            }
        }

        let sent = results.iter().filter(|r| r.ok).count();
        let failed = results.len() - sent;
        tracing::info!("dispatch finished: {} sent, {} failed", sent, failed);

        Ok(DispatchOutcome {
            sent,
            failed,
            results,
        })
    }

    /// The daily cron sends exactly one post, the oldest pending one.
    pub async fn dispatch_next(&self) -> Result<DispatchOutcome> {
        let Some(post) = self.posts.oldest_pending().await? else {
            tracing::info!("daily dispatch: nothing pending");
            return Ok(DispatchOutcome::default());
        };
        self.dispatch(Some(std::slice::from_ref(&post.id)), None, None)
            .await
    }
}
