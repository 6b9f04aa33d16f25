use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Timeout applied to every outbound image download.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Lower bound of the simulated per-image processing delay.
    #[serde(default = "default_delay_min_ms")]
    pub processing_delay_min_ms: u64,

    /// Upper bound of the simulated per-image processing delay.
    #[serde(default = "default_delay_max_ms")]
    pub processing_delay_max_ms: u64,

    /// Maximum number of images processed at once across all jobs (0 = unlimited).
    #[serde(default)]
    pub max_concurrent_fetches: usize,

    /// Optional JSON store master file replacing the built-in store table.
    #[serde(default)]
    pub store_master_path: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_delay_min_ms() -> u64 {
    100
}

fn default_delay_max_ms() -> u64 {
    400
}

/// Inclusive range of milliseconds to sleep after an image has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            processing_delay_min_ms: default_delay_min_ms(),
            processing_delay_max_ms: default_delay_max_ms(),
            max_concurrent_fetches: 0,
            store_master_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.processing_delay_min_ms > self.processing_delay_max_ms {
            return Err(ConfigError::InvertedDelay {
                min: self.processing_delay_min_ms,
                max: self.processing_delay_max_ms,
            });
        }
        if self.max_concurrent_fetches > Semaphore::MAX_PERMITS {
            return Err(ConfigError::ConcurrencyTooHigh {
                requested: self.max_concurrent_fetches,
                max: Semaphore::MAX_PERMITS,
            });
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// `None` when both delay bounds are zero.
    pub fn processing_delay(&self) -> Option<DelayRange> {
        if self.processing_delay_min_ms == 0 && self.processing_delay_max_ms == 0 {
            return None;
        }
        Some(DelayRange {
            min_ms: self.processing_delay_min_ms,
            max_ms: self.processing_delay_max_ms,
        })
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        (self.max_concurrent_fetches > 0).then_some(self.max_concurrent_fetches)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FETCH_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,

    #[error("processing delay bounds are inverted (min {min} ms > max {max} ms)")]
    InvertedDelay { min: u64, max: u64 },

    #[error("MAX_CONCURRENT_FETCHES is {requested}, above the supported maximum of {max}")]
    ConcurrencyTooHigh { requested: usize, max: usize },
}
