//! GitSummit API server

use axum::{
    routing::{get, post},
    Router,
};
use common::SystemClock;
use processor::{SyncConfig, SyncService};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gitsummit=debug".parse()?)
                .add_directive("api=debug".parse()?),
        )
        .init();

    info!("Starting GitSummit API");

    // Load configuration
    let config = common::Config::from_env();

    if config.github_webhook_secret.is_none() {
        warn!("GITHUB_WEBHOOK_SECRET unset: webhook endpoint will refuse all deliveries");
    }
    if config.cron_secret.is_none() {
        warn!("CRON_SECRET unset: cron endpoints will refuse all requests");
    }

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Create app state
    let clock = Arc::new(SystemClock);
    let state = Arc::new(AppState::new(config.clone(), pool, clock));

    // Start background poll sync (if enabled)
    if config.sync_interval_minutes > 0 {
        let sync_config = SyncConfig {
            interval: Duration::from_secs(config.sync_interval_minutes as u64 * 60),
        };
        let sync_service = SyncService::new(state.ingestor.clone(), sync_config);
        tokio::spawn(async move {
            sync_service.run().await;
        });
        info!(
            "Background poll sync enabled (every {} minutes)",
            config.sync_interval_minutes
        );
    } else {
        info!("Background poll sync disabled (SYNC_INTERVAL_MINUTES=0)");
    }

    // Build router
    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/webhooks/github", post(routes::webhooks::github))
        .route("/api/leaderboard", get(routes::leaderboard::global))
        .route(
            "/api/users/:login/friends/leaderboard",
            get(routes::leaderboard::friends),
        )
        .route(
            "/api/groups/:id/leaderboard",
            get(routes::leaderboard::group),
        )
        .route("/api/users/:login", get(routes::users::get))
        .route("/api/users/:login/trophies", get(routes::users::trophies))
        .route("/api/users/:login/events", get(routes::users::events))
        .route("/api/users/:login/history", get(routes::users::history))
        .route("/api/users/:login/groups", get(routes::users::groups))
        .route(
            "/api/users/:login/streak-bonuses",
            get(routes::users::streak_bonuses),
        )
        .route("/api/friends/:login/sync", post(routes::users::sync_friends))
        .route("/api/groups", post(routes::groups::create))
        .route("/api/groups/join", post(routes::groups::join))
        .route("/api/groups/:id", get(routes::groups::get))
        .route(
            "/api/repos",
            get(routes::repos::list).post(routes::repos::link),
        )
        .route(
            "/api/cron/weekly-reset",
            get(routes::cron::weekly_reset).post(routes::cron::weekly_reset),
        )
        .route(
            "/api/cron/sync",
            get(routes::cron::sync).post(routes::cron::sync),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
