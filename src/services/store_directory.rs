//! Store master lookup.
//!
//! The directory is built once at startup and only read while jobs run, so
//! it is shared behind an `Arc` without any locking.

use std::collections::HashMap;
use std::path::Path;

use crate::models::store::Store;

/// Read-only mapping from store id to store metadata.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    stores: HashMap<String, Store>,
}

impl StoreDirectory {
    /// The reference store master.
    pub fn builtin() -> Self {
        Self::from_stores([
            Store::new("S00339218", "Store A", "NYC"),
            Store::new("S01408764", "Store B", "LA"),
        ])
    }

    pub fn from_stores(stores: impl IntoIterator<Item = Store>) -> Self {
        let stores = stores
            .into_iter()
            .map(|store| (store.store_id.clone(), store))
            .collect();
        Self { stores }
    }

    /// Load a JSON array of `{store_id, store_name, area_code}` records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreDirectoryError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(StoreDirectoryError::Io)?;
        let stores: Vec<Store> = serde_json::from_str(&raw).map_err(StoreDirectoryError::Parse)?;
        if stores.is_empty() {
            return Err(StoreDirectoryError::Empty);
        }
        Ok(Self::from_stores(stores))
    }

    pub fn lookup(&self, store_id: &str) -> Option<&Store> {
        self.stores.get(store_id)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreDirectoryError {
    #[error("Failed to read store master file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store master file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Store master file contains no stores")]
    Empty,
}
