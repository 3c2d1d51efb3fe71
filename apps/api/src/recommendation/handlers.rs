use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::recommendation::resolver::{ConsumptionMode, EmptyCandidatePolicy, Resolution};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub resolution: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<Resolution> for RecommendationResponse {
    fn from(resolution: Resolution) -> Self {
        let message = resolution.message();
        Self {
            resolution,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub ceiling: u32,
    pub used: u32,
    pub remaining: u32,
    pub mode: ConsumptionMode,
    pub empty_candidate_policy: EmptyCandidatePolicy,
}

/// POST /api/v1/recommendations
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    info!("Received recommendation prompt ({} chars)", req.prompt.len());
    let resolution = state.resolver.resolve(&req.prompt).await?;
    Ok(Json(resolution.into()))
}

/// POST /api/v1/recommendations/direct
pub async fn handle_recommend_direct(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let resolution = state.resolver.recommend_direct(&req.prompt).await?;
    Ok(Json(resolution.into()))
}

/// GET /api/v1/recommendations/quota
pub async fn handle_quota(State(state): State<AppState>) -> Json<QuotaResponse> {
    let limiter = state.resolver.limiter();
    Json(QuotaResponse {
        ceiling: limiter.ceiling(),
        used: limiter.used(),
        remaining: limiter.remaining(),
        mode: state.resolver.mode(),
        empty_candidate_policy: state.resolver.policy(),
    })
}
