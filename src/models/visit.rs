use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::job::{JobId, JobSnapshot, JobStatus};
use crate::models::result::{ImageResult, StoreError};

/// One store visit with the images captured during it.
///
/// Missing fields take their empty value; only unrecognized fields are
/// rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Visit {
    #[serde(default)]
    pub store_id: String,
    #[serde(rename = "image_url", default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub visit_time: String,
}

/// Request body for job submission.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SubmitJobRequest {
    #[serde(default)]
    #[garde(custom(matches_visit_count(&self.visits)))]
    pub count: i64,

    #[serde(default)]
    #[garde(skip)]
    pub visits: Vec<Visit>,
}

/// `count` must agree with the number of visits actually supplied.
fn matches_visit_count(visits: &[Visit]) -> impl FnOnce(&i64, &()) -> garde::Result + '_ {
    move |count, _| match usize::try_from(*count) {
        Ok(count) if count == visits.len() => Ok(()),
        _ => Err(garde::Error::new("Count does not match number of visits")),
    }
}

/// Response after submitting a job.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
}

/// Response for querying job status.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub job_id: String,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<StoreError>>,
}

impl From<&JobSnapshot> for JobStatusResponse {
    fn from(snapshot: &JobSnapshot) -> Self {
        Self {
            status: snapshot.status,
            job_id: snapshot.id.to_string(),
            errors: (snapshot.status == JobStatus::Failed).then(|| snapshot.errors.clone()),
        }
    }
}

/// Full per-image outcome of a job.
#[derive(Debug, Serialize)]
pub struct JobResultsResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<ImageResult>,
    #[serde(rename = "error")]
    pub errors: Vec<StoreError>,
}

impl From<JobSnapshot> for JobResultsResponse {
    fn from(snapshot: JobSnapshot) -> Self {
        Self {
            job_id: snapshot.id,
            status: snapshot.status,
            created_at: snapshot.created_at,
            completed_at: snapshot.completed_at,
            results: snapshot.results,
            errors: snapshot.errors,
        }
    }
}
