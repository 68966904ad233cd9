// Health check endpoint handler implementation

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::handlers::AppState;
use crate::services::health::HealthChecker;

/// Handler for GET /health - Returns OK while the store answers
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health_checker = HealthChecker::new(&state);
    if health_checker.check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
    }
}
