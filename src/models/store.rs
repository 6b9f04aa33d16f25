use serde::{Deserialize, Serialize};

/// A store from the store master.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub store_id: String,
    pub store_name: String,
    pub area_code: String,
}

impl Store {
    pub fn new(
        store_id: impl Into<String>,
        store_name: impl Into<String>,
        area_code: impl Into<String>,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            store_name: store_name.into(),
            area_code: area_code.into(),
        }
    }
}
