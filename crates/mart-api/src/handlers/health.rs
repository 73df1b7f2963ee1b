//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use mart_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let db_healthy = state.pool().acquire().await.is_ok();

    let response = ReadinessResponse::ready(db_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        tracing::warn!("Readiness check failed: database unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
