use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use pixeldrop_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/posts",
            get(routes::posts::list_posts).post(routes::posts::create_post),
        )
        .route("/api/posts/bulk", delete(routes::posts::bulk_delete_posts))
        .route(
            "/api/posts/:id",
            patch(routes::posts::update_post).delete(routes::posts::delete_post),
        )
        .route("/api/caption", post(routes::caption::generate_caption))
        .route("/api/scheduler", post(routes::scheduler::dispatch_all))
        .route(
            "/api/scheduler/selected",
            post(routes::scheduler::dispatch_selected),
        )
        .route(
            "/api/config",
            get(routes::settings::get_settings).post(routes::settings::update_settings),
        )
        .route("/api/test-telegram", post(routes::settings::test_telegram))
        .route(
            "/api/cron/cleanup",
            get(routes::cron::cleanup).post(routes::cron::cleanup),
        )
        .route(
            "/api/cron/daily-post",
            get(routes::cron::daily_post).post(routes::cron::daily_post),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
