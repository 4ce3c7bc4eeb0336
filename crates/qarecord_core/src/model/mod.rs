//! Domain records persisted by the QA store.
//!
//! # Invariants
//! - Record ids are assigned by the store and never reused.
//! - Records are immutable in this layer once inserted.

pub mod paging;
pub mod sonar;
pub mod tp_record;
