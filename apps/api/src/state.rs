use std::sync::Arc;

use sqlx::PgPool;

use crate::recommendation::resolver::Resolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Recommendation pipeline. Owns the process-wide oracle rate limiter.
    pub resolver: Arc<Resolver>,
}
