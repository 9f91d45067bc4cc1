use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use pulse::service::Health;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.service.health().await {
        Health::Healthy => (StatusCode::OK, Json(HealthResponse { status: "healthy" })),
        Health::Degraded => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "degraded" }),
        ),
    }
}
