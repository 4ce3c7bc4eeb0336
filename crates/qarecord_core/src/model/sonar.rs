//! Code-quality scan record model.

use serde::{Deserialize, Serialize};

/// One quality scan result for an application.
///
/// `metrics` is opaque to the store layer and persisted as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaSonar {
    /// Assigned by the store on insert.
    pub id: i64,
    pub application_id: i64,
    pub project_id: i64,
    pub branch: String,
    pub commit_id: String,
    pub operator_id: String,
    pub metrics: serde_json::Value,
    /// Epoch milliseconds. `0` lets the repository stamp insert time.
    pub created_at: i64,
    /// Epoch milliseconds. Orders scans of one application; `0` lets the
    /// repository stamp insert time.
    pub updated_at: i64,
}

impl QaSonar {
    /// Creates an unsaved scan record with the given metrics payload.
    pub fn new(application_id: i64, metrics: serde_json::Value) -> Self {
        Self {
            id: 0,
            application_id,
            project_id: 0,
            branch: String::new(),
            commit_id: String::new(),
            operator_id: String::new(),
            metrics,
            created_at: 0,
            updated_at: 0,
        }
    }
}
