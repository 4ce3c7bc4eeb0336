//! Error taxonomy shared by record repositories and the session manager.
//!
//! # Invariants
//! - "Absent" (`NotFound`) and "broken" (`Store`, `Connection`) are distinct
//!   variants; callers branch on the variant, never on message text.
//! - `Store` always carries the operation name and key that failed.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Keyed lookup matched zero rows.
    NotFound { entity: &'static str, key: String },
    /// Statement, transaction or row-count fault.
    Store { context: String, fault: StoreFault },
    /// A session could not be opened against the store.
    Connection(DbError),
    /// Caller input violated an operation precondition.
    InvalidArgument(String),
    /// Persisted row cannot be converted into a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing from the store.
    MissingRequiredTable(&'static str),
}

/// Underlying cause of a [`RepoError::Store`].
#[derive(Debug)]
pub enum StoreFault {
    Db(DbError),
    /// Driver reported a different number of written rows than requested.
    AffectedRows { expected: usize, actual: usize },
    Encode(serde_json::Error),
}

impl RepoError {
    /// Returns `true` when the error means "no such record".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(entity: &'static str, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn affected_rows(
        context: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::Store {
            context: context.into(),
            fault: StoreFault::AffectedRows { expected, actual },
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Store { context, fault } => write!(f, "{context}: {fault}"),
            Self::Connection(err) => write!(f, "failed to open store session: {err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { fault, .. } => Some(fault),
            Self::Connection(err) => Some(err),
            Self::NotFound { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl Display for StoreFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::AffectedRows { expected, actual } => {
                write!(f, "affected rows mismatch: expected {expected}, got {actual}")
            }
            Self::Encode(err) => write!(f, "failed to encode column value: {err}"),
        }
    }
}

impl Error for StoreFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::AffectedRows { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

/// Failure while mapping one result row into a read model.
///
/// Has no operation context of its own; [`RowError::in_context`] supplies it
/// once the caller knows which lookup produced the row.
#[derive(Debug)]
pub(crate) enum RowError {
    Column(rusqlite::Error),
    Invalid(String),
}

impl RowError {
    pub(crate) fn in_context(self, context: &str) -> RepoError {
        match self {
            Self::Column(err) => RepoError::Store {
                context: context.to_string(),
                fault: StoreFault::Db(DbError::Sqlite(err)),
            },
            Self::Invalid(message) => RepoError::InvalidData(message),
        }
    }
}

impl From<rusqlite::Error> for RowError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Column(value)
    }
}

/// Attaches operation context to low-level store failures.
///
/// Units of work passed to `run_in_session` use this to turn driver errors
/// into [`RepoError::Store`].
pub trait StoreContext<T> {
    fn store_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> RepoResult<T>;
}

impl<T> StoreContext<T> for rusqlite::Result<T> {
    fn store_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> RepoResult<T> {
        self.map_err(|err| RepoError::Store {
            context: context().into(),
            fault: StoreFault::Db(DbError::Sqlite(err)),
        })
    }
}

impl<T> StoreContext<T> for serde_json::Result<T> {
    fn store_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> RepoResult<T> {
        self.map_err(|err| RepoError::Store {
            context: context().into(),
            fault: StoreFault::Encode(err),
        })
    }
}
