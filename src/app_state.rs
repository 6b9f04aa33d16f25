use std::sync::Arc;

use crate::services::{processor::JobProcessor, registry::JobRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub processor: Arc<JobProcessor>,
}

impl AppState {
    pub fn new(registry: JobRegistry, processor: JobProcessor) -> Self {
        Self {
            registry: Arc::new(registry),
            processor: Arc::new(processor),
        }
    }
}
