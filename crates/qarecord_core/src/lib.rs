//! Data-access core for QA test records and code-quality scans.
//!
//! Repositories borrow an explicit SQLite connection opened through
//! [`db::open_db`]; multi-row writes run inside a [`db::Session`].
//! The [`monitor`] module is a thin client for the monitoring service.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod repo;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, run_in_session, DbError, Session};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::paging::{Page, PagingRequest};
pub use model::sonar::QaSonar;
pub use model::tp_record::{RecordType, TestTotals, TpRecord, TpRecordId, TpRecordSummary};
pub use monitor::{
    Alert, HttpMonitorClient, MonitorClient, MonitorError, MonitorResult, ReportTask,
};
pub use repo::error::{RepoError, RepoResult, StoreContext, StoreFault};
pub use repo::sonar_repo::{SonarRepository, SqliteSonarRepository};
pub use repo::tp_record_repo::{SqliteTpRecordRepository, TpRecordRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
