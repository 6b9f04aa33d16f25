use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::models::result::{ImageResult, StoreError};

pub type JobId = u64;

/// Status of a store-visit job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Ongoing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Ongoing)
    }
}

/// A batch of store visits being processed.
///
/// Identity and creation time are fixed at construction. Everything that
/// changes while images are processed lives behind the job's own lock, which
/// is only ever held to append one entry or flip the status.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    created_at: DateTime<Utc>,
    state: Mutex<JobState>,
}

#[derive(Debug)]
struct JobState {
    status: JobStatus,
    results: Vec<ImageResult>,
    errors: Vec<StoreError>,
    completed_at: Option<DateTime<Utc>>,
}

/// Point-in-time copy of a job, taken under its lock.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub results: Vec<ImageResult>,
    pub errors: Vec<StoreError>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(JobState {
                status: JobStatus::Ongoing,
                results: Vec::new(),
                errors: Vec::new(),
                completed_at: None,
            }),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> JobStatus {
        self.state.lock().status
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.state.lock();
        JobSnapshot {
            id: self.id,
            status: state.status,
            results: state.results.clone(),
            errors: state.errors.clone(),
            created_at: self.created_at,
            completed_at: state.completed_at,
        }
    }

    pub fn record_result(&self, result: ImageResult) {
        self.state.lock().results.push(result);
    }

    /// Append a failure and move an ongoing job to `Failed`.
    pub fn record_failure(&self, error: StoreError) {
        let mut state = self.state.lock();
        if state.status == JobStatus::Ongoing {
            state.status = JobStatus::Failed;
        }
        state.errors.push(error);
    }

    /// Settle the job once all of its work has been joined.
    ///
    /// An ongoing job becomes `Completed`; a failed one stays failed. The
    /// completion timestamp is only ever written once.
    pub fn finish(&self) -> JobStatus {
        let mut state = self.state.lock();
        if state.status == JobStatus::Ongoing {
            state.status = JobStatus::Completed;
        }
        if state.completed_at.is_none() {
            state.completed_at = Some(Utc::now());
        }
        state.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::Dimensions;
    use crate::models::store::Store;

    fn sample_result(url: &str) -> ImageResult {
        let store = Store::new("S00339218", "Store A", "NYC");
        ImageResult::new(&store, url, Dimensions::new(100, 50))
    }

    #[test]
    fn test_new_job_is_ongoing() {
        let job = Job::new(1);
        let snapshot = job.snapshot();
        assert_eq!(snapshot.status, JobStatus::Ongoing);
        assert!(snapshot.results.is_empty());
        assert!(snapshot.errors.is_empty());
        assert!(snapshot.completed_at.is_none());
    }

    #[test]
    fn test_finish_without_failures_completes() {
        let job = Job::new(1);
        job.record_result(sample_result("a"));
        assert_eq!(job.finish(), JobStatus::Completed);
        assert!(job.snapshot().completed_at.is_some());
    }

    #[test]
    fn test_failure_survives_finish() {
        let job = Job::new(1);
        job.record_result(sample_result("a"));
        job.record_failure(StoreError::new("S00339218", "error decoding image: bad"));
        job.record_result(sample_result("b"));

        assert_eq!(job.finish(), JobStatus::Failed);
        let snapshot = job.snapshot();
        assert_eq!(snapshot.results.len(), 2);
        assert_eq!(snapshot.errors.len(), 1);
    }

    #[test]
    fn test_completed_at_written_once() {
        let job = Job::new(1);
        job.finish();
        let first = job.snapshot().completed_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        job.finish();
        assert_eq!(job.snapshot().completed_at, first);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(JobStatus::Ongoing.to_string(), "ongoing");
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Ongoing.is_terminal());
    }
}
