use serde::{Deserialize, Serialize};

use crate::models::store::Store;

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (f64::from(self.width) + f64::from(self.height))
    }
}

/// Outcome of one successfully processed image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResult {
    pub store_id: String,
    pub store_name: String,
    pub area_code: String,
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub perimeter: f64,
}

impl ImageResult {
    pub fn new(store: &Store, image_url: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            store_id: store.store_id.clone(),
            store_name: store.store_name.clone(),
            area_code: store.area_code.clone(),
            image_url: image_url.into(),
            width: dimensions.width,
            height: dimensions.height,
            perimeter: dimensions.perimeter(),
        }
    }
}

/// A failure attributed to a store: unknown id, download or decode error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreError {
    pub store_id: String,
    pub error: String,
}

impl StoreError {
    pub const UNKNOWN_STORE: &'static str = "Store ID does not exist";

    pub fn new(store_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            error: error.into(),
        }
    }

    pub fn unknown_store(store_id: impl Into<String>) -> Self {
        Self::new(store_id, Self::UNKNOWN_STORE)
    }
}
