//! System endpoints: liveness and a JSON 404 fallback.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        environment: state.config.server.environment.clone(),
    })
}

/// Fallback for unmatched routes. Keeps the error body JSON like every
/// other endpoint.
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Route not found")),
    )
}
