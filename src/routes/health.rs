use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub jobs_tracked: usize,
    pub stores_known: usize,
}

/// GET /health — liveness plus a summary of in-memory state.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs_tracked: state.registry.len(),
        stores_known: state.processor.stores().len(),
    })
}
