//! Transactional session lifecycle for multi-row units of work.
//!
//! # Responsibility
//! - Open one write transaction per unit of work.
//! - Commit on success, roll back on failure, release the transaction on
//!   every exit path.
//!
//! # Invariants
//! - A session owns its connection borrow exclusively until closed.
//! - Dropping an unfinished session rolls back.
//! - Rollback failures are logged, never raised; the unit of work's own error
//!   is the one returned to the caller.

use crate::db::DbError;
use crate::repo::error::{RepoError, RepoResult, StoreContext};
use log::{debug, error};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::ops::Deref;
use std::time::Instant;

/// One open write transaction against the store.
///
/// Dereferences to [`Connection`] so statements run inside the transaction.
pub struct Session<'conn> {
    tx: Transaction<'conn>,
    started_at: Instant,
}

impl<'conn> Session<'conn> {
    /// Opens a new session with an immediate write lock.
    ///
    /// # Errors
    /// - Returns [`RepoError::Connection`] when the store refuses the
    ///   transaction (busy, locked or closed).
    pub fn begin(conn: &'conn mut Connection) -> RepoResult<Self> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| {
                error!("event=session_begin module=db status=error error={err}");
                RepoError::Connection(DbError::Sqlite(err))
            })?;
        debug!("event=session_begin module=db status=ok");
        Ok(Self {
            tx,
            started_at: Instant::now(),
        })
    }

    /// Closes the session: rolls back when `failed`, commits otherwise.
    ///
    /// Only a commit failure is returned; rollback is best-effort.
    pub fn close(self, failed: bool) -> RepoResult<()> {
        if failed {
            self.rollback();
            Ok(())
        } else {
            self.commit()
        }
    }

    /// Commits all writes made through this session.
    pub fn commit(self) -> RepoResult<()> {
        let started_at = self.started_at;
        self.tx.commit().store_context(|| "commit session")?;
        debug!(
            "event=session_close module=db status=ok action=commit duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Discards all writes made through this session.
    pub fn rollback(self) {
        let started_at = self.started_at;
        match self.tx.rollback() {
            Ok(()) => debug!(
                "event=session_close module=db status=ok action=rollback duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=session_close module=db status=error action=rollback duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
    }
}

impl Deref for Session<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}

/// Runs `work` inside a fresh session and closes it based on the outcome.
///
/// `Ok` commits (a commit failure becomes the result); `Err` rolls back and
/// returns the original error unchanged.
pub fn run_in_session<T>(
    conn: &mut Connection,
    work: impl FnOnce(&Session<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let session = Session::begin(conn)?;
    match work(&session) {
        Ok(value) => {
            session.commit()?;
            Ok(value)
        }
        Err(err) => {
            session.rollback();
            Err(err)
        }
    }
}
