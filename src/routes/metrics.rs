use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Install the global Prometheus recorder and describe the job metrics.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!("visit_jobs_submitted_total", "Total jobs accepted");
    metrics::describe_counter!(
        "visit_jobs_completed_total",
        "Jobs whose every image was processed"
    );
    metrics::describe_counter!(
        "visit_jobs_failed_total",
        "Jobs that ended with at least one store error"
    );
    metrics::describe_counter!(
        "visit_images_processed_total",
        "Images whose dimensions were measured"
    );
    metrics::describe_counter!(
        "visit_images_failed_total",
        "Images that could not be downloaded or decoded"
    );
    metrics::describe_histogram!(
        "visit_image_fetch_seconds",
        "Time spent fetching and measuring one image"
    );

    Ok(handle)
}

/// GET /metrics — Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
