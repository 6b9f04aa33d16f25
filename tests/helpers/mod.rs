//! Shared helpers for processor and API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use store_visit_jobs::app_state::AppState;
use store_visit_jobs::models::job::{Job, JobSnapshot};
use store_visit_jobs::models::result::Dimensions;
use store_visit_jobs::models::visit::Visit;
use store_visit_jobs::routes;
use store_visit_jobs::services::image_fetcher::{FetchError, ImageFetcher};
use store_visit_jobs::services::processor::JobProcessor;
use store_visit_jobs::services::registry::JobRegistry;
use store_visit_jobs::services::store_directory::StoreDirectory;

pub const STORE_A: &str = "S00339218";
pub const STORE_B: &str = "S01408764";

enum StubResponse {
    Image(Dimensions),
    Status(u16),
    Panic,
}

/// Scripted `ImageFetcher` that records every URL it is asked for.
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            gate: None,
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn image(mut self, url: &str, width: u32, height: u32) -> Self {
        self.responses
            .insert(url.to_string(), StubResponse::Image(Dimensions::new(width, height)));
        self
    }

    pub fn status(mut self, url: &str, code: u16) -> Self {
        self.responses
            .insert(url.to_string(), StubResponse::Status(code));
        self
    }

    pub fn panicking(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), StubResponse::Panic);
        self
    }

    /// Every fetch waits for one permit from `gate` before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Dimensions, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(url) {
            Some(StubResponse::Image(dims)) => Ok(*dims),
            Some(StubResponse::Status(code)) => Err(FetchError::Status(*code)),
            Some(StubResponse::Panic) => panic!("stub fetcher asked to panic for {url}"),
            None => Err(FetchError::Status(404)),
        }
    }
}

pub fn visit(store_id: &str, urls: &[&str]) -> Visit {
    Visit {
        store_id: store_id.to_string(),
        image_urls: urls.iter().map(|u| u.to_string()).collect(),
        visit_time: "2024-01-01T10:00:00Z".to_string(),
    }
}

pub fn processor(fetcher: Arc<StubFetcher>) -> Arc<JobProcessor> {
    Arc::new(JobProcessor::new(Arc::new(StoreDirectory::builtin()), fetcher))
}

/// Poll until the job has settled, failing the test after five seconds.
pub async fn wait_for_terminal(job: &Job) -> JobSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = job.snapshot();
            if snapshot.status.is_terminal() && snapshot.completed_at.is_some() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not settle in time")
}

/// Poll until the fetcher has seen `count` calls.
pub async fn wait_for_calls(fetcher: &StubFetcher, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while fetcher.calls().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("fetcher was not called in time");
}

pub fn build_test_app(fetcher: Arc<StubFetcher>) -> (Router, AppState) {
    let processor = JobProcessor::new(Arc::new(StoreDirectory::builtin()), fetcher);
    let state = AppState::new(JobRegistry::new(), processor);
    (routes::router(state.clone()), state)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST `body` with an optional `Content-Type` header.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    body: &str,
    content_type: Option<&str>,
) -> Response<Body> {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
