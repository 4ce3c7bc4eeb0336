//! Test-point record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keyed lookups by id and by commit identifier.
//! - Paginated listing of the fixed summary projection per application.
//! - Single and atomic multi-row inserts.
//!
//! # Invariants
//! - Keyed lookups never return "absent" as success.
//! - A batch insert persists every row or none of them.
//! - `commit_id` is not unique in the store; commit lookups return the record
//!   with the highest id among the matches.

use crate::db::run_in_session;
use crate::model::paging::{Page, PagingRequest};
use crate::model::tp_record::{RecordType, TestTotals, TpRecord, TpRecordId, TpRecordSummary};
use crate::repo::error::{RepoError, RepoResult, RowError, StoreContext};
use crate::repo::{ensure_connection_ready, stamp_or_now};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TP_RECORD_ENTITY: &str = "tp record";

const TP_RECORD_SELECT_SQL: &str = "SELECT
    id,
    app_id,
    app_name,
    project_id,
    name,
    uuid,
    branch,
    git_repo,
    commit_id,
    operator_id,
    operator_name,
    totals,
    type,
    parser_type,
    workspace,
    created_at,
    updated_at
FROM tp_records";

const TP_RECORD_SUMMARY_SELECT_SQL: &str = "SELECT
    id,
    name,
    branch,
    operator_name,
    totals,
    type,
    created_at
FROM tp_records";

const TP_RECORD_INSERT_SQL: &str = "INSERT INTO tp_records (
    app_id,
    app_name,
    project_id,
    name,
    uuid,
    branch,
    git_repo,
    commit_id,
    operator_id,
    operator_name,
    totals,
    type,
    parser_type,
    workspace,
    created_at,
    updated_at
) VALUES ";

const TP_RECORD_INSERT_PLACEHOLDERS: &str = "(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Rows per multi-row INSERT, kept well below SQLite's bound parameter limit.
const BATCH_CHUNK_ROWS: usize = 500;

/// Repository interface for test-point records.
pub trait TpRecordRepository {
    /// Loads one record by primary key.
    fn find_by_id(&self, id: TpRecordId) -> RepoResult<TpRecord>;
    /// Loads one record by commit identifier.
    fn find_by_commit_id(&self, commit_id: &str) -> RepoResult<TpRecord>;
    /// Lists one page of record summaries for an application, newest id first.
    fn list_by_app_id(&self, request: &PagingRequest) -> RepoResult<Page<TpRecordSummary>>;
    /// Inserts one record and returns it with store-assigned fields.
    fn insert(&self, record: &TpRecord) -> RepoResult<TpRecord>;
    /// Inserts all records in one session, or none of them.
    fn insert_batch(&mut self, records: &[TpRecord]) -> RepoResult<()>;
}

/// SQLite-backed test-point record repository.
pub struct SqliteTpRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTpRecordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tp_records"])?;
        Ok(Self { conn })
    }

    fn find_one(&self, sql: &str, key: &Value, context: &str) -> RepoResult<Option<TpRecord>> {
        let mut stmt = self.conn.prepare_cached(sql).store_context(|| context)?;
        let mut rows = stmt.query([key]).store_context(|| context)?;
        let Some(row) = rows.next().store_context(|| context)? else {
            return Ok(None);
        };
        parse_tp_record_row(row)
            .map(Some)
            .map_err(|err| err.in_context(context))
    }
}

impl TpRecordRepository for SqliteTpRecordRepository<'_> {
    fn find_by_id(&self, id: TpRecordId) -> RepoResult<TpRecord> {
        let context = format!("find tp record by id={id}");
        self.find_one(
            &format!("{TP_RECORD_SELECT_SQL} WHERE id = ?1;"),
            &Value::Integer(id),
            &context,
        )?
        .ok_or_else(|| RepoError::not_found(TP_RECORD_ENTITY, format!("id={id}")))
    }

    fn find_by_commit_id(&self, commit_id: &str) -> RepoResult<TpRecord> {
        let context = format!("find tp record by commit_id={commit_id}");
        self.find_one(
            &format!("{TP_RECORD_SELECT_SQL} WHERE commit_id = ?1 ORDER BY id DESC LIMIT 1;"),
            &Value::Text(commit_id.to_string()),
            &context,
        )?
        .ok_or_else(|| RepoError::not_found(TP_RECORD_ENTITY, format!("commit_id={commit_id}")))
    }

    fn list_by_app_id(&self, request: &PagingRequest) -> RepoResult<Page<TpRecordSummary>> {
        request.validate().map_err(RepoError::InvalidArgument)?;
        let context = format!(
            "list tp records by app_id={} page_no={} page_size={}",
            request.app_id, request.page_no, request.page_size
        );
        let offset = i64::try_from(request.offset()).map_err(|_| {
            RepoError::InvalidArgument(format!("page offset {} is out of range", request.offset()))
        })?;

        // Count and fetch are separate statements; total may race with inserts.
        let total: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM tp_records WHERE app_id = ?1;",
                [request.app_id],
                |row| row.get(0),
            )
            .store_context(|| context.as_str())?;
        let total = u64::try_from(total).unwrap_or(0);
        if total <= request.offset() {
            return Ok(Page {
                total,
                ..Page::empty()
            });
        }

        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "{TP_RECORD_SUMMARY_SELECT_SQL}
                 WHERE app_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2 OFFSET ?3;"
            ))
            .store_context(|| context.as_str())?;
        let mut rows = stmt
            .query(params![request.app_id, i64::from(request.page_size), offset])
            .store_context(|| context.as_str())?;

        let mut list = Vec::new();
        while let Some(row) = rows.next().store_context(|| context.as_str())? {
            list.push(parse_summary_row(row).map_err(|err| err.in_context(&context))?);
        }

        Ok(Page { total, list })
    }

    fn insert(&self, record: &TpRecord) -> RepoResult<TpRecord> {
        let context = format!("insert tp record app_id={}", record.app_id);
        let mut stored = record.clone();
        stored.created_at = stamp_or_now(record.created_at);
        stored.updated_at = stamp_or_now(record.updated_at);

        let values = record_values(&stored).store_context(|| context.as_str())?;
        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "{TP_RECORD_INSERT_SQL}{TP_RECORD_INSERT_PLACEHOLDERS};"
            ))
            .store_context(|| context.as_str())?;
        let affected = stmt
            .execute(params_from_iter(values))
            .store_context(|| context.as_str())?;
        if affected != 1 {
            return Err(RepoError::affected_rows(context, 1, affected));
        }

        stored.id = self.conn.last_insert_rowid();
        Ok(stored)
    }

    fn insert_batch(&mut self, records: &[TpRecord]) -> RepoResult<()> {
        if records.is_empty() {
            return Err(RepoError::InvalidArgument(
                "batch insert requires at least one record".to_string(),
            ));
        }
        let context = format!("insert tp records count={}", records.len());

        run_in_session(self.conn, |session| {
            let mut affected = 0;
            for chunk in records.chunks(BATCH_CHUNK_ROWS) {
                let mut values = Vec::with_capacity(chunk.len() * 16);
                for record in chunk {
                    let mut stored = record.clone();
                    stored.created_at = stamp_or_now(record.created_at);
                    stored.updated_at = stamp_or_now(record.updated_at);
                    values.extend(record_values(&stored).store_context(|| context.as_str())?);
                }

                let placeholders = vec![TP_RECORD_INSERT_PLACEHOLDERS; chunk.len()].join(", ");
                affected += session
                    .execute(
                        &format!("{TP_RECORD_INSERT_SQL}{placeholders};"),
                        params_from_iter(values),
                    )
                    .store_context(|| context.as_str())?;
            }

            if affected != records.len() {
                return Err(RepoError::affected_rows(
                    context.as_str(),
                    records.len(),
                    affected,
                ));
            }
            Ok(())
        })
    }
}

fn record_values(record: &TpRecord) -> serde_json::Result<Vec<Value>> {
    let totals = serde_json::to_string(&record.totals)?;
    Ok(vec![
        Value::Integer(record.app_id),
        Value::Text(record.app_name.clone()),
        Value::Integer(record.project_id),
        Value::Text(record.name.clone()),
        Value::Text(record.uuid.clone()),
        Value::Text(record.branch.clone()),
        Value::Text(record.git_repo.clone()),
        record
            .commit_id
            .clone()
            .map_or(Value::Null, Value::Text),
        Value::Text(record.operator_id.clone()),
        Value::Text(record.operator_name.clone()),
        Value::Text(totals),
        Value::Text(record.record_type.as_db_str().to_string()),
        Value::Text(record.parser_type.clone()),
        Value::Text(record.workspace.clone()),
        Value::Integer(record.created_at),
        Value::Integer(record.updated_at),
    ])
}

fn parse_tp_record_row(row: &Row<'_>) -> Result<TpRecord, RowError> {
    Ok(TpRecord {
        id: row.get("id")?,
        app_id: row.get("app_id")?,
        app_name: row.get("app_name")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        uuid: row.get("uuid")?,
        branch: row.get("branch")?,
        git_repo: row.get("git_repo")?,
        commit_id: row.get("commit_id")?,
        operator_id: row.get("operator_id")?,
        operator_name: row.get("operator_name")?,
        totals: parse_totals(row)?,
        record_type: parse_record_type(row)?,
        parser_type: row.get("parser_type")?,
        workspace: row.get("workspace")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_summary_row(row: &Row<'_>) -> Result<TpRecordSummary, RowError> {
    Ok(TpRecordSummary {
        id: row.get("id")?,
        name: row.get("name")?,
        branch: row.get("branch")?,
        operator_name: row.get("operator_name")?,
        totals: parse_totals(row)?,
        record_type: parse_record_type(row)?,
        created_at: row.get("created_at")?,
    })
}

fn parse_totals(row: &Row<'_>) -> Result<TestTotals, RowError> {
    let text: String = row.get("totals")?;
    serde_json::from_str(&text).map_err(|err| {
        RowError::Invalid(format!("invalid totals `{text}` in tp_records.totals: {err}"))
    })
}

fn parse_record_type(row: &Row<'_>) -> Result<RecordType, RowError> {
    let text: String = row.get("type")?;
    RecordType::from_db_str(&text).ok_or_else(|| {
        RowError::Invalid(format!("invalid record type `{text}` in tp_records.type"))
    })
}
