//! Job orchestration.
//!
//! A job is processed by one detached task that walks the submitted visits
//! in order, resolves each store and launches one task per image. Image
//! tasks write into the job under its lock as they finish; the orchestrating
//! task joins all of them before settling the job's final status.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::models::job::{Job, JobStatus};
use crate::models::result::{ImageResult, StoreError};
use crate::models::store::Store;
use crate::models::visit::Visit;
use crate::services::image_fetcher::ImageFetcher;
use crate::services::store_directory::StoreDirectory;

pub struct JobProcessor {
    stores: Arc<StoreDirectory>,
    fetcher: Arc<dyn ImageFetcher>,
    permits: Option<Arc<Semaphore>>,
}

impl JobProcessor {
    pub fn new(stores: Arc<StoreDirectory>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            stores,
            fetcher,
            permits: None,
        }
    }

    /// Cap the number of images processed at once across all jobs.
    /// `None` leaves fan-out unbounded. Limits above
    /// `Semaphore::MAX_PERMITS` are clamped to it.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.permits = limit.map(|n| Arc::new(Semaphore::new(n.min(Semaphore::MAX_PERMITS))));
        self
    }

    pub fn stores(&self) -> &StoreDirectory {
        &self.stores
    }

    /// Process `visits` for `job` in the background.
    ///
    /// The caller only keeps the job id; progress is observed by polling the
    /// job itself.
    pub fn spawn(self: &Arc<Self>, job: Arc<Job>, visits: Vec<Visit>) -> JoinHandle<JobStatus> {
        let processor = Arc::clone(self);
        tokio::spawn(async move { processor.run(job, visits).await })
    }

    /// Process all visits of a job and return its terminal status.
    ///
    /// The first visit naming an unknown store fails the job immediately and
    /// nothing after it is looked at. Images already launched for earlier
    /// visits still run to completion and are joined before the job settles.
    pub async fn run(&self, job: Arc<Job>, visits: Vec<Visit>) -> JobStatus {
        let job_id = job.id();
        tracing::info!(job_id, visits = visits.len(), "Processing job");

        let mut units = Vec::new();

        for visit in visits {
            let Some(store) = self.stores.lookup(&visit.store_id) else {
                tracing::warn!(
                    job_id,
                    store_id = %visit.store_id,
                    "Unknown store, skipping remaining visits"
                );
                job.record_failure(StoreError::unknown_store(visit.store_id));
                break;
            };

            for image_url in visit.image_urls {
                let handle = self.launch(Arc::clone(&job), store.clone(), image_url);
                units.push((visit.store_id.clone(), handle));
            }
        }

        for (store_id, handle) in units {
            if let Err(e) = handle.await {
                tracing::error!(job_id, store_id = %store_id, error = %e, "Image task aborted");
                job.record_failure(StoreError::new(
                    store_id,
                    format!("image processing task aborted: {e}"),
                ));
            }
        }

        let status = job.finish();
        match status {
            JobStatus::Failed => metrics::counter!("visit_jobs_failed_total").increment(1),
            _ => metrics::counter!("visit_jobs_completed_total").increment(1),
        }

        let snapshot = job.snapshot();
        tracing::info!(
            job_id,
            status = %status,
            results = snapshot.results.len(),
            errors = snapshot.errors.len(),
            "Job finished"
        );

        status
    }

    fn launch(&self, job: Arc<Job>, store: Store, image_url: String) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let permits = self.permits.clone();

        tokio::spawn(async move {
            // The semaphore is never closed.
            let _permit = match permits {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            process_image(fetcher.as_ref(), &job, &store, image_url).await;
        })
    }
}

async fn process_image(fetcher: &dyn ImageFetcher, job: &Job, store: &Store, image_url: String) {
    let start = Instant::now();
    let outcome = fetcher.fetch(&image_url).await;
    metrics::histogram!("visit_image_fetch_seconds").record(start.elapsed().as_secs_f64());

    match outcome {
        Ok(dimensions) => {
            tracing::debug!(
                job_id = job.id(),
                store_id = %store.store_id,
                image_url = %image_url,
                width = dimensions.width,
                height = dimensions.height,
                "Image processed"
            );
            metrics::counter!("visit_images_processed_total").increment(1);
            job.record_result(ImageResult::new(store, image_url, dimensions));
        }
        Err(e) => {
            tracing::warn!(
                job_id = job.id(),
                store_id = %store.store_id,
                image_url = %image_url,
                error = %e,
                "Image processing failed"
            );
            metrics::counter!("visit_images_failed_total").increment(1);
            job.record_failure(StoreError::new(store.store_id.clone(), e.to_string()));
        }
    }
}
