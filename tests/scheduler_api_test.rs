use std::collections::HashSet;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value as JsonValue};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use pixeldrop_backend::error::{Error, Result};
use pixeldrop_backend::services::telegram_service::BotApi;
use pixeldrop_backend::{routes, AppState};

const CRON_SECRET: &str = "cron-test-secret";

#[derive(Clone)]
struct SentPhoto {
    bot_token: String,
    chat_id: String,
    photo_url: String,
    caption: Option<String>,
}

/// Records every send instead of talking to Telegram. Individual photo URLs
/// can be marked as failing to simulate an undeliverable image.
#[derive(Default)]
struct RecordingBot {
    calls: Mutex<Vec<SentPhoto>>,
    fail_urls: Mutex<HashSet<String>>,
}

impl RecordingBot {
    fn fail_on(&self, photo_url: &str) {
        self.fail_urls.lock().unwrap().insert(photo_url.to_string());
    }

    fn calls(&self) -> Vec<SentPhoto> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotApi for RecordingBot {
    async fn send_photo(
        &self,
        bot_token: &str,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        if self.fail_urls.lock().unwrap().contains(photo_url) {
            return Err(Error::BadRequest(
                "Telegram could not download the image. Check that the URL is public.".to_string(),
            ));
        }
        self.calls.lock().unwrap().push(SentPhoto {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            photo_url: photo_url.to_string(),
            caption: caption.map(|c| c.to_string()),
        });
        Ok(())
    }

    async fn get_me(&self, _bot_token: &str) -> Result<JsonValue> {
        Ok(json!({ "username": "pixeldrop_bot" }))
    }

    async fn get_chat(&self, _bot_token: &str, chat_id: &str) -> Result<JsonValue> {
        Ok(json!({ "id": chat_id, "title": "PixelDrop Channel" }))
    }
}

async fn setup() -> (Router, AppState, Arc<RecordingBot>) {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("BRAND_NAME", "PixelDrop");
    env::set_var("CRON_SECRET", CRON_SECRET);
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("TELEGRAM_CHANNEL_ID");
    env::remove_var("OPENAI_API_KEY");
    let _ = pixeldrop_backend::config::init_config();

    let pool = pixeldrop_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let bot = Arc::new(RecordingBot::default());
    let state = AppState::with_bot(pool, reqwest::Client::new(), bot.clone());
    let app = Router::new()
        .route("/api/scheduler", post(routes::scheduler::dispatch_all))
        .route(
            "/api/scheduler/selected",
            post(routes::scheduler::dispatch_selected),
        )
        .route("/api/cron/daily-post", get(routes::cron::daily_post))
        .route("/api/cron/cleanup", get(routes::cron::cleanup))
        .with_state(state.clone());
    (app, state, bot)
}

async fn seed_post(pool: &SqlitePool, image_url: &str, status: &str, hour: u32) -> String {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap();
    sqlx::query("INSERT INTO posts (id, image_url, caption, status, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(image_url)
        .bind(format!("Caption for {}", image_url))
        .bind(status)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("seed post");
    id
}

async fn post_status(pool: &SqlitePool, id: &str) -> (String, Option<String>) {
    sqlx::query_as::<_, (String, Option<String>)>("SELECT status, sent_at FROM posts WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("post row")
}

async fn store_credentials(state: &AppState) {
    state
        .config_service
        .upsert(Some("12345:seed-token"), Some("@pixeldrop"))
        .await
        .expect("store credentials");
}

fn dispatch_request(body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri("/api/scheduler")
        .header("authorization", format!("Bearer {}", CRON_SECRET));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn dispatch_sends_pending_posts_oldest_first() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;

    // Insert the newer post first so ordering has to come from created_at.
    let newer = seed_post(&state.pool, "https://cdn.example.com/newer.png", "PENDING", 10).await;
    let older = seed_post(&state.pool, "https://cdn.example.com/older.png", "PENDING", 9).await;
    let already_sent =
        seed_post(&state.pool, "https://cdn.example.com/done.png", "SENT", 8).await;

    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["posted"], 2);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["results"][0]["id"].as_str().unwrap(), older);
    assert_eq!(body["results"][0]["ok"], true);
    assert!(body["results"][0].get("error").is_none());
    assert_eq!(body["results"][1]["id"].as_str().unwrap(), newer);

    let calls = bot.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].photo_url, "https://cdn.example.com/older.png");
    assert_eq!(calls[1].photo_url, "https://cdn.example.com/newer.png");
    assert_eq!(calls[0].chat_id, "@pixeldrop");
    assert_eq!(calls[0].bot_token, "12345:seed-token");
    assert_eq!(
        calls[0].caption.as_deref(),
        Some("Caption for https://cdn.example.com/older.png")
    );

    let (status, sent_at) = post_status(&state.pool, &older).await;
    assert_eq!(status, "SENT");
    assert!(sent_at.is_some());
    let (status, _) = post_status(&state.pool, &newer).await;
    assert_eq!(status, "SENT");
    let (status, _) = post_status(&state.pool, &already_sent).await;
    assert_eq!(status, "SENT");
}

#[tokio::test]
async fn dispatch_continues_after_a_mid_batch_failure() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;

    let first = seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;
    let broken = seed_post(&state.pool, "https://cdn.example.com/broken.png", "PENDING", 10).await;
    let last = seed_post(&state.pool, "https://cdn.example.com/c.png", "PENDING", 11).await;
    bot.fail_on("https://cdn.example.com/broken.png");

    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["posted"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["results"][1]["id"].as_str().unwrap(), broken);
    assert_eq!(body["results"][1]["ok"], false);
    assert_eq!(
        body["results"][1]["error"],
        "Telegram could not download the image. Check that the URL is public."
    );

    let (status, _) = post_status(&state.pool, &first).await;
    assert_eq!(status, "SENT");
    let (status, sent_at) = post_status(&state.pool, &broken).await;
    assert_eq!(status, "PENDING");
    assert!(sent_at.is_none());
    let (status, _) = post_status(&state.pool, &last).await;
    assert_eq!(status, "SENT");
}

#[tokio::test]
async fn dispatch_with_nothing_pending_is_a_no_op() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;
    seed_post(&state.pool, "https://cdn.example.com/done.png", "SENT", 9).await;

    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "No pending posts to send");
    assert!(bot.calls().is_empty());
}

#[tokio::test]
async fn dispatch_requires_a_bot_token() {
    let (app, state, bot) = setup().await;
    let id = seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;

    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["error"],
        "Telegram bot token is not configured. Save one in settings or set TELEGRAM_BOT_TOKEN."
    );

    assert!(bot.calls().is_empty());
    let (status, _) = post_status(&state.pool, &id).await;
    assert_eq!(status, "PENDING");
}

#[tokio::test]
async fn dispatch_selected_sends_only_chosen_pending_posts() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;

    let skipped = seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;
    let chosen = seed_post(&state.pool, "https://cdn.example.com/b.png", "PENDING", 10).await;
    let already_sent = seed_post(&state.pool, "https://cdn.example.com/c.png", "SENT", 11).await;
    let missing = Uuid::new_v4().to_string();

    let req = Request::builder()
        .method("POST")
        .uri("/api/scheduler/selected")
        .header("authorization", format!("Bearer {}", CRON_SECRET))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "ids": [chosen, already_sent, missing] }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["posted"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["id"].as_str().unwrap(), chosen);

    assert_eq!(bot.calls().len(), 1);
    let (status, _) = post_status(&state.pool, &skipped).await;
    assert_eq!(status, "PENDING");
    let (status, _) = post_status(&state.pool, &chosen).await;
    assert_eq!(status, "SENT");

    // Selecting only non-pending posts is an error, not a silent no-op.
    let req = Request::builder()
        .method("POST")
        .uri("/api/scheduler/selected")
        .header("authorization", format!("Bearer {}", CRON_SECRET))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "ids": [already_sent] }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "None of the selected posts are pending");

    let req = Request::builder()
        .method("POST")
        .uri("/api/scheduler/selected")
        .header("authorization", format!("Bearer {}", CRON_SECRET))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "ids": [] }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dispatch_rejects_bad_cron_secrets() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;
    let id = seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/scheduler")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Unauthorized");

    let req = Request::builder()
        .method("POST")
        .uri("/api/scheduler")
        .header("authorization", "Bearer wrong-secret")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/cron/cleanup")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(bot.calls().is_empty());
    let (status, _) = post_status(&state.pool, &id).await;
    assert_eq!(status, "PENDING");

    // The right secret still goes through.
    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(bot.calls().len(), 1);
}

#[tokio::test]
async fn daily_post_sends_exactly_the_oldest_pending_post() {
    let (app, state, bot) = setup().await;
    store_credentials(&state).await;

    let older = seed_post(&state.pool, "https://cdn.example.com/older.png", "PENDING", 9).await;
    let newer = seed_post(&state.pool, "https://cdn.example.com/newer.png", "PENDING", 10).await;

    let uri = format!("/api/cron/daily-post?secret={}", CRON_SECRET);
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["posted"], 1);
    assert_eq!(body["post_id"].as_str().unwrap(), older);

    assert_eq!(bot.calls().len(), 1);
    assert_eq!(bot.calls()[0].photo_url, "https://cdn.example.com/older.png");
    let (status, _) = post_status(&state.pool, &newer).await;
    assert_eq!(status, "PENDING");

    // The next run picks up the remaining post.
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["post_id"].as_str().unwrap(), newer);

    // Then there is nothing left.
    let req = Request::builder()
        .method("GET")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "No pending posts");
}

#[tokio::test]
async fn daily_post_reports_unconfigured_telegram() {
    let (app, state, bot) = setup().await;
    seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/cron/daily-post?secret={}", CRON_SECRET))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Telegram is not configured");
    assert!(bot.calls().is_empty());
}

#[tokio::test]
async fn dispatch_body_overrides_stored_credentials() {
    let (app, state, bot) = setup().await;

    // Only a token stored: sends fall back to the default channel.
    state
        .config_service
        .upsert(Some("12345:seed-token"), None)
        .await
        .expect("store token");
    seed_post(&state.pool, "https://cdn.example.com/a.png", "PENDING", 9).await;

    let resp = app.clone().oneshot(dispatch_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        bot.calls()[0].chat_id,
        pixeldrop_backend::services::config_service::DEFAULT_CHANNEL_ID
    );

    // Credentials in the request body win over stored ones.
    seed_post(&state.pool, "https://cdn.example.com/b.png", "PENDING", 10).await;
    let resp = app
        .clone()
        .oneshot(dispatch_request(Some(json!({
            "bot_token": "99999:override-token",
            "channel_id": "@override"
        }))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let calls = bot.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].bot_token, "99999:override-token");
    assert_eq!(calls[1].chat_id, "@override");
}
