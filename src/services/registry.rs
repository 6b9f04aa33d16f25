use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::job::{Job, JobId};

/// In-memory job registry. Lives for the lifetime of the process.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Job>>>,
    next_id: AtomicU64,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate the next job id and register an ongoing job under it.
    ///
    /// Allocation and insertion happen under the same write lock, so a job
    /// is visible to `get` as soon as its id has been handed out.
    pub fn create(&self) -> Arc<Job> {
        let mut jobs = self.jobs.write();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Arc::new(Job::new(id));
        jobs.insert(id, Arc::clone(&job));
        job
    }

    pub fn get(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
