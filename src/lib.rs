pub mod captions;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use reqwest::Client;
use sqlx::SqlitePool;

use crate::services::{
    caption_service::CaptionService,
    config_service::ConfigService,
    dispatch_service::DispatchService,
    exif_service::ExifService,
    post_service::PostService,
    telegram_service::{BotApi, TelegramService},
    vision_service::VisionService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub post_service: PostService,
    pub config_service: ConfigService,
    pub caption_service: CaptionService,
    pub dispatch_service: DispatchService,
    pub bot: Arc<dyn BotApi>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();
        let bot: Arc<dyn BotApi> = Arc::new(TelegramService::new(http_client.clone()));
        Self::with_bot(pool, http_client, bot)
    }

    /// Tests hand in a recording [`BotApi`] here instead of the real gateway.
    pub fn with_bot(pool: SqlitePool, http_client: Client, bot: Arc<dyn BotApi>) -> Self {
        let config = crate::config::get_config();

        let post_service = PostService::new(pool.clone());
        let config_service = ConfigService::new(pool.clone());
        let exif_service = ExifService::new(http_client.clone());
        let vision_service = VisionService::new(config.openai_api_key.clone(), http_client);
        let caption_service = CaptionService::new(exif_service, vision_service);
        let dispatch_service =
            DispatchService::new(post_service.clone(), config_service.clone(), bot.clone());

        Self {
            pool,
            post_service,
            config_service,
            caption_service,
            dispatch_service,
            bot,
        }
    }
}
