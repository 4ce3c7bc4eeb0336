//! Repository layer for QA records.
//!
//! # Responsibility
//! - Define typed find/insert/list contracts for test-point and scan records.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories borrow an explicit, migrated connection; there is no
//!   process-wide store handle.
//! - Keyed lookups report absence as `RepoError::NotFound`; "latest" lookups
//!   report absence as `Ok(None)`.

use crate::db::migrations::latest_version;
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod error;
pub mod sonar_repo;
pub mod tp_record_repo;

use error::{RepoError, RepoResult, StoreContext};

/// Verifies that `conn` is migrated and carries `tables`.
fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .store_context(|| "read schema version")?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .store_context(|| format!("check table {table}"))?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Returns `value` unless it is `0`, in which case the current epoch ms.
fn stamp_or_now(value: i64) -> i64 {
    if value != 0 {
        return value;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
