use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "pricing-calculator";

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.calculations.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": SERVICE_NAME,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "service": SERVICE_NAME,
                    "error": e.to_string(),
                })),
            )
        }
    }
}
