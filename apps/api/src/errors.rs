use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::repository::RepositoryError;
use crate::recommendation::ResolveError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let message = err.to_string();
        match err {
            ResolveError::RateLimitExceeded { .. } => AppError::RateLimited(message),
            ResolveError::Timeout { .. } => AppError::Timeout(message),
            ResolveError::OracleTransport(e) => AppError::Llm(e.to_string()),
            ResolveError::Repository(RepositoryError::Database(e)) => AppError::Database(e),
            ResolveError::Repository(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::RateLimited(msg) => {
                tracing::warn!("Rate limited: {msg}");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "API request limit reached".to_string(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::error!("Timeout: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    "An upstream service timed out".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "Failed to fetch recommendations".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
