//! Test-point record model.
//!
//! One record summarizes one execution report of a test tool (unit or
//! integration) for an application at a given branch/commit.

use serde::{Deserialize, Serialize};

/// Store-assigned primary key. `0` means "not yet persisted".
pub type TpRecordId = i64;

/// Kind of test run a record summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// Unit tests.
    #[serde(rename = "UT")]
    Unit,
    /// Integration tests.
    #[serde(rename = "IT")]
    Integration,
}

impl RecordType {
    /// Column value stored in `tp_records.type`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Unit => "UT",
            Self::Integration => "IT",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "UT" => Some(Self::Unit),
            "IT" => Some(Self::Integration),
            _ => None,
        }
    }
}

/// Aggregated outcome counters of one test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTotals {
    pub tests: u64,
    pub duration_ms: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub errored: u64,
}

/// Full test-point record as stored in `tp_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpRecord {
    /// Assigned by the store on insert.
    pub id: TpRecordId,
    pub app_id: i64,
    pub app_name: String,
    pub project_id: i64,
    pub name: String,
    /// Report identifier emitted by the test tool.
    pub uuid: String,
    pub branch: String,
    pub git_repo: String,
    /// Not unique at the store level; see `find_by_commit_id`.
    pub commit_id: Option<String>,
    pub operator_id: String,
    pub operator_name: String,
    pub totals: TestTotals,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub parser_type: String,
    pub workspace: String,
    /// Epoch milliseconds. `0` lets the repository stamp insert time.
    pub created_at: i64,
    /// Epoch milliseconds. `0` lets the repository stamp insert time.
    pub updated_at: i64,
}

impl TpRecord {
    /// Creates an unsaved record with empty descriptive fields.
    pub fn new(app_id: i64, name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            id: 0,
            app_id,
            app_name: String::new(),
            project_id: 0,
            name: name.into(),
            uuid: String::new(),
            branch: String::new(),
            git_repo: String::new(),
            commit_id: None,
            operator_id: String::new(),
            operator_name: String::new(),
            totals: TestTotals::default(),
            record_type,
            parser_type: String::new(),
            workspace: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Returns whether the store has assigned an id to this record.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Listing projection of a record.
///
/// Only `id, name, branch, operator_name, totals, type, created_at` are read
/// for paginated listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpRecordSummary {
    pub id: TpRecordId,
    pub name: String,
    pub branch: String,
    pub operator_name: String,
    pub totals: TestTotals,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub created_at: i64,
}
