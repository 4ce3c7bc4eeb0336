//! Remote monitoring service collaborator.
//!
//! # Responsibility
//! - Fetch alert and report-task resources by id or by scope.
//! - Classify failures as transport, status, empty-result or decode errors.
//!
//! # Invariants
//! - By-id lookups treat a missing payload as `MonitorError::EmptyResult`.
//! - By-scope lookups treat an empty list as `Ok(None)`.

mod client;
mod error;
mod model;

pub use client::{HttpMonitorClient, MonitorClient, INTERNAL_CLIENT_HEADER};
pub use error::{MonitorError, MonitorResult};
pub use model::{Alert, ReportTask};
