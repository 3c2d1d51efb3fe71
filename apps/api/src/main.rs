mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod recommendation;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::catalog::repository::PgCourseRepository;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::recommendation::oracle::RecommendationOracle;
use crate::recommendation::rate_limiter::RateLimiter;
use crate::recommendation::resolver::{Resolver, ResolverSettings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catalog API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.repository_timeout).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // One limiter for the whole process; every resolution draws from it.
    let limiter = Arc::new(RateLimiter::new(config.oracle_request_ceiling));
    let oracle = RecommendationOracle::new(Arc::new(llm), limiter, config.oracle_timeout);

    let resolver = Resolver::new(
        Arc::new(PgCourseRepository::new(db.clone())),
        oracle,
        ResolverSettings {
            mode: config.recommendation_mode,
            policy: config.empty_candidate_policy,
            repository_timeout: config.repository_timeout,
        },
    );
    info!(
        "Recommendation resolver ready (mode: {:?}, empty candidates: {:?}, oracle ceiling: {})",
        resolver.mode(),
        resolver.policy(),
        config.oracle_request_ceiling
    );

    // Build app state
    let state = AppState {
        db,
        resolver: Arc::new(resolver),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
