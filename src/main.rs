use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod chain;
mod config;
mod constants;
mod crypto;
mod db;
mod error;
mod models;
mod neynar;
mod services;

use chain::ChainClient;
use config::Config;
use db::Database;
use neynar::NeynarClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nts_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting NTS Cast Trigger Backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Chain ID: {}", config.chain_id);

    // Initialize database
    let db = Database::new(&config).await?;

    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // Chain and Neynar clients are shared between the API and the
    // background services.
    let chain = Arc::new(ChainClient::from_config(&config)?);
    let neynar = Arc::new(NeynarClient::from_config(&config)?);

    let app_state = api::AppState {
        db: db.clone(),
        config: config.clone(),
        chain: chain.clone(),
        neynar: neynar.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start background services
    tokio::spawn(services::start_background_services(
        db.clone(),
        chain.clone(),
        neynar.clone(),
    ));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/", get(root))
        .route("/health", get(api::health::health_check))
        // Webhooks & signing
        .route("/api/neynar-cast", post(api::webhook::neynar_cast))
        .route("/api/sign-cast", post(api::webhook::sign_cast))
        // Game actions
        .route("/api/claim-accumulated", post(api::game::claim_accumulated))
        .route("/api/multiplier/{address}", get(api::game::get_multiplier))
        // Sign In With Neynar proxies
        .route(
            "/api/farcaster/sign-in",
            get(api::farcaster::sign_in_status).post(api::farcaster::sign_in),
        )
        .route(
            "/api/farcaster/verify",
            get(api::farcaster::verify_status).post(api::farcaster::verify),
        )
        // Leaderboards
        .route("/api/leaderboard", get(api::leaderboard::live_leaderboard))
        .route(
            "/api/leaderboard/snapshot/weekly",
            get(api::leaderboard::weekly_snapshot),
        )
        .route(
            "/api/leaderboard/snapshot/monthly",
            get(api::leaderboard::monthly_snapshot),
        )
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "NTS Cast Trigger Backend Running"
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
