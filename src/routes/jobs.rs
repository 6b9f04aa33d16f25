use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use std::sync::Arc;

use crate::app_state::AppState;
use crate::models::job::{Job, JobId};
use crate::models::visit::{
    JobResultsResponse, JobStatusResponse, SubmitJobRequest, SubmitJobResponse,
};

/// Rejections for a submission; rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid request payload")]
    InvalidPayload,

    #[error("Count does not match number of visits")]
    CountMismatch,
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Why a `jobid` query parameter did not resolve to a job.
#[derive(Debug, thiserror::Error)]
pub enum JobLookupError {
    #[error("Missing job ID")]
    Missing,

    #[error("Invalid job ID")]
    Invalid,

    #[error("Job not found")]
    NotFound,
}

impl IntoResponse for JobLookupError {
    fn into_response(self) -> Response {
        match self {
            // An unknown job is reported as an empty object, not as an error body.
            JobLookupError::NotFound => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({}))).into_response()
            }
            other => (StatusCode::BAD_REQUEST, other.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobQuery {
    pub jobid: Option<String>,
}

/// POST /api/submit — Create a job and start processing it in the background.
///
/// The body is parsed as JSON whatever its `Content-Type`.
pub async fn submit_job(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitJobResponse>), SubmitError> {
    let request: SubmitJobRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!(error = %err, "Rejected submission body");
        SubmitError::InvalidPayload
    })?;

    if request.count == 0 && !request.visits.is_empty() {
        return Err(SubmitError::InvalidPayload);
    }
    request.validate().map_err(|report| {
        tracing::debug!(error = %report, "Submission count check failed");
        SubmitError::CountMismatch
    })?;

    let job = state.registry.create();
    metrics::counter!("visit_jobs_submitted_total").increment(1);
    tracing::info!(
        job_id = job.id(),
        visits = request.visits.len(),
        "Job submitted"
    );

    state.processor.spawn(Arc::clone(&job), request.visits);

    Ok((StatusCode::CREATED, Json(SubmitJobResponse { job_id: job.id() })))
}

/// GET /api/status?jobid=N — Current status of a job.
pub async fn job_status(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<JobStatusResponse>, JobLookupError> {
    let job = find_job(&state, &query)?;
    Ok(Json(JobStatusResponse::from(&job.snapshot())))
}

/// GET /api/results?jobid=N — Status plus every recorded result and error.
pub async fn job_results(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<JobResultsResponse>, JobLookupError> {
    let job = find_job(&state, &query)?;
    Ok(Json(JobResultsResponse::from(job.snapshot())))
}

fn find_job(state: &AppState, query: &JobQuery) -> Result<Arc<Job>, JobLookupError> {
    let raw = query
        .jobid
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(JobLookupError::Missing)?;
    let id: i64 = raw.parse().map_err(|_| JobLookupError::Invalid)?;
    // Well-formed ids that can never be allocated are simply unknown.
    let id = JobId::try_from(id).map_err(|_| JobLookupError::NotFound)?;
    state.registry.get(id).ok_or(JobLookupError::NotFound)
}
