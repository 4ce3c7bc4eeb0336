//! Quality-scan repository contracts and SQLite implementation.
//!
//! # Invariants
//! - "Latest" means maximum `updated_at` per application, ties broken by id.
//! - An application without scans is a normal state: the latest lookup
//!   returns `Ok(None)`, unlike the keyed lookup which returns `NotFound`.

use crate::model::sonar::QaSonar;
use crate::repo::error::{RepoError, RepoResult, RowError, StoreContext};
use crate::repo::{ensure_connection_ready, stamp_or_now};
use rusqlite::{params, Connection, Row};

const SONAR_ENTITY: &str = "sonar record";

const SONAR_SELECT_SQL: &str = "SELECT
    id,
    application_id,
    project_id,
    branch,
    commit_id,
    operator_id,
    metrics,
    created_at,
    updated_at
FROM qa_sonar";

/// Repository interface for quality-scan records.
pub trait SonarRepository {
    /// Loads one scan by primary key.
    fn find_by_id(&self, id: i64) -> RepoResult<QaSonar>;
    /// Loads the most recently updated scan of an application, if any.
    fn find_latest_by_app_id(&self, app_id: i64) -> RepoResult<Option<QaSonar>>;
    /// Inserts one scan and returns it with store-assigned fields.
    fn insert(&self, sonar: &QaSonar) -> RepoResult<QaSonar>;
}

/// SQLite-backed quality-scan repository.
pub struct SqliteSonarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSonarRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["qa_sonar"])?;
        Ok(Self { conn })
    }

    fn query_first(&self, sql: &str, key: i64, context: &str) -> RepoResult<Option<QaSonar>> {
        let mut stmt = self.conn.prepare_cached(sql).store_context(|| context)?;
        let mut rows = stmt.query([key]).store_context(|| context)?;
        let Some(row) = rows.next().store_context(|| context)? else {
            return Ok(None);
        };
        parse_sonar_row(row)
            .map(Some)
            .map_err(|err| err.in_context(context))
    }
}

impl SonarRepository for SqliteSonarRepository<'_> {
    fn find_by_id(&self, id: i64) -> RepoResult<QaSonar> {
        self.query_first(
            &format!("{SONAR_SELECT_SQL} WHERE id = ?1;"),
            id,
            &format!("find sonar record by id={id}"),
        )?
        .ok_or_else(|| RepoError::not_found(SONAR_ENTITY, format!("id={id}")))
    }

    fn find_latest_by_app_id(&self, app_id: i64) -> RepoResult<Option<QaSonar>> {
        self.query_first(
            &format!(
                "{SONAR_SELECT_SQL}
                 WHERE application_id = ?1
                 ORDER BY updated_at DESC, id DESC
                 LIMIT 1;"
            ),
            app_id,
            &format!("find latest sonar record by app_id={app_id}"),
        )
    }

    fn insert(&self, sonar: &QaSonar) -> RepoResult<QaSonar> {
        let context = format!("insert sonar record app_id={}", sonar.application_id);
        let mut stored = sonar.clone();
        stored.created_at = stamp_or_now(sonar.created_at);
        stored.updated_at = stamp_or_now(sonar.updated_at);
        let metrics = serde_json::to_string(&stored.metrics).store_context(|| context.as_str())?;

        let affected = self
            .conn
            .execute(
                "INSERT INTO qa_sonar (
                    application_id,
                    project_id,
                    branch,
                    commit_id,
                    operator_id,
                    metrics,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    stored.application_id,
                    stored.project_id,
                    stored.branch,
                    stored.commit_id,
                    stored.operator_id,
                    metrics,
                    stored.created_at,
                    stored.updated_at,
                ],
            )
            .store_context(|| context.as_str())?;
        if affected != 1 {
            return Err(RepoError::affected_rows(context, 1, affected));
        }

        stored.id = self.conn.last_insert_rowid();
        Ok(stored)
    }
}

fn parse_sonar_row(row: &Row<'_>) -> Result<QaSonar, RowError> {
    let metrics_text: String = row.get("metrics")?;
    let metrics = serde_json::from_str(&metrics_text).map_err(|err| {
        RowError::Invalid(format!("invalid metrics in qa_sonar.metrics: {err}"))
    })?;

    Ok(QaSonar {
        id: row.get("id")?,
        application_id: row.get("application_id")?,
        project_id: row.get("project_id")?,
        branch: row.get("branch")?,
        commit_id: row.get("commit_id")?,
        operator_id: row.get("operator_id")?,
        metrics,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
