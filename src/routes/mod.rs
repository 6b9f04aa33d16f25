use axum::{routing::get, routing::post, Router};

use crate::app_state::AppState;

pub mod health;
pub mod jobs;
pub mod metrics;

/// API routes bound to the shared job state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/submit", post(jobs::submit_job))
        .route("/api/submit/", post(jobs::submit_job))
        .route("/api/status", get(jobs::job_status))
        .route("/api/results", get(jobs::job_results))
        // Unprefixed paths kept for existing clients.
        .route("/submit", post(jobs::submit_job))
        .route("/submit/", post(jobs::submit_job))
        .route("/status", get(jobs::job_status))
        .route("/results", get(jobs::job_results))
        .with_state(state)
}
