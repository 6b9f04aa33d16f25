use async_trait::async_trait;
use image::ImageReader;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::io::Cursor;
use std::time::Duration;

use crate::config::DelayRange;
use crate::models::result::Dimensions;

/// Source of image dimensions for a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Dimensions, FetchError>;
}

/// Downloads images over HTTP and reads their pixel dimensions.
pub struct HttpImageFetcher {
    http: Client,
    delay: Option<DelayRange>,
}

impl HttpImageFetcher {
    /// Build a fetcher whose downloads give up after `timeout`.
    ///
    /// When `delay` is set, every successful fetch sleeps for a uniformly
    /// chosen number of milliseconds within the range before returning.
    pub fn new(timeout: Duration, delay: Option<DelayRange>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("store-visit-jobs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { http, delay })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Dimensions, FetchError> {
        let request = self.http.get(url).build().map_err(FetchError::Request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(FetchError::Download)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::Download)?;
        let dimensions = decode_dimensions(&body)?;

        if let Some(range) = self.delay {
            tokio::time::sleep(sample_delay(range)).await;
        }

        Ok(dimensions)
    }
}

/// Read width and height from an encoded image without decoding its pixels.
pub fn decode_dimensions(bytes: &[u8]) -> Result<Dimensions, FetchError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FetchError::Decode(e.into()))?;

    let (width, height) = reader.into_dimensions().map_err(FetchError::Decode)?;
    Ok(Dimensions::new(width, height))
}

fn sample_delay(range: DelayRange) -> Duration {
    let ms = rand::rng().random_range(range.min_ms..=range.max_ms);
    Duration::from_millis(ms)
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("error building HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("error creating request: {0}")]
    Request(reqwest::Error),

    #[error("error downloading image: {0}")]
    Download(reqwest::Error),

    #[error("error downloading image: status code {0}")]
    Status(u16),

    #[error("error decoding image: {0}")]
    Decode(#[from] image::ImageError),
}
