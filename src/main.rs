use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use store_visit_jobs::app_state::AppState;
use store_visit_jobs::config::AppConfig;
use store_visit_jobs::routes;
use store_visit_jobs::services::{
    image_fetcher::HttpImageFetcher, processor::JobProcessor, registry::JobRegistry,
    store_directory::StoreDirectory,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");
    config.validate().expect("Invalid configuration");

    tracing::info!("Initializing store-visit-jobs server");

    let prometheus_handle =
        Arc::new(routes::metrics::install_recorder().expect("Failed to install Prometheus recorder"));

    let stores = match &config.store_master_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading store master file");
            StoreDirectory::from_json_file(path).expect("Failed to load store master")
        }
        None => StoreDirectory::builtin(),
    };
    tracing::info!(stores = stores.len(), "Store directory ready");

    let fetcher = HttpImageFetcher::new(config.fetch_timeout(), config.processing_delay())
        .expect("Failed to initialize image fetcher");

    let processor = JobProcessor::new(Arc::new(stores), Arc::new(fetcher))
        .with_concurrency_limit(config.max_concurrency());

    let state = AppState::new(JobRegistry::new(), processor);

    let app = routes::router(state)
        .merge(
            Router::new()
                .route("/metrics", get(routes::metrics::prometheus_metrics))
                .with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
