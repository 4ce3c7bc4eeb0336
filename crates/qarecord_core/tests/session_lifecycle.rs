use qarecord_core::db::{open_db_in_memory, run_in_session, Session};
use qarecord_core::{RepoError, StoreContext, StoreFault};
use rusqlite::Connection;
use std::panic::{catch_unwind, AssertUnwindSafe};

fn scratch_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE scratch (value TEXT NOT NULL);")
        .unwrap();
    conn
}

fn scratch_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM scratch;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn successful_unit_of_work_commits() {
    let mut conn = scratch_db();

    let inserted = run_in_session(&mut conn, |session| {
        session
            .execute("INSERT INTO scratch (value) VALUES ('a'), ('b');", [])
            .store_context(|| "insert scratch")?;
        Ok(2)
    })
    .unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(scratch_rows(&conn), 2);
    assert!(conn.is_autocommit());
}

#[test]
fn failed_unit_of_work_rolls_back_and_keeps_original_error() {
    let mut conn = scratch_db();

    let err = run_in_session(&mut conn, |session| -> Result<(), RepoError> {
        session
            .execute("INSERT INTO scratch (value) VALUES ('a');", [])
            .store_context(|| "insert scratch")?;
        Err(RepoError::InvalidArgument("stop here".to_string()))
    })
    .unwrap_err();

    assert!(matches!(err, RepoError::InvalidArgument(ref message) if message == "stop here"));
    assert_eq!(scratch_rows(&conn), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn statement_failure_inside_unit_of_work_carries_its_context() {
    let mut conn = scratch_db();

    let err = run_in_session(&mut conn, |session| {
        session
            .execute("INSERT INTO scratch (value) VALUES (NULL);", [])
            .store_context(|| "insert scratch value=null")
    })
    .unwrap_err();

    match err {
        RepoError::Store { context, fault } => {
            assert_eq!(context, "insert scratch value=null");
            assert!(matches!(fault, StoreFault::Db(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(conn.is_autocommit());
}

#[test]
fn commit_failure_is_reported_and_session_released() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parent (id INTEGER PRIMARY KEY);
         CREATE TABLE child (
             id INTEGER PRIMARY KEY,
             parent_id INTEGER NOT NULL
                 REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED
         );",
    )
    .unwrap();

    // The deferred foreign key is only checked at COMMIT.
    let err = run_in_session(&mut conn, |session| {
        session
            .execute("INSERT INTO child (id, parent_id) VALUES (1, 99);", [])
            .store_context(|| "insert child")
    })
    .unwrap_err();

    match err {
        RepoError::Store { context, fault } => {
            assert_eq!(context, "commit session");
            assert!(matches!(fault, StoreFault::Db(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(conn.is_autocommit());
    let children: i64 = conn
        .query_row("SELECT COUNT(*) FROM child;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(children, 0);
}

#[test]
fn close_decides_between_commit_and_rollback() {
    let mut conn = scratch_db();

    let session = Session::begin(&mut conn).unwrap();
    session
        .execute("INSERT INTO scratch (value) VALUES ('discarded');", [])
        .unwrap();
    session.close(true).unwrap();
    assert_eq!(scratch_rows(&conn), 0);

    let session = Session::begin(&mut conn).unwrap();
    session
        .execute("INSERT INTO scratch (value) VALUES ('kept');", [])
        .unwrap();
    session.close(false).unwrap();
    assert_eq!(scratch_rows(&conn), 1);
}

#[test]
fn dropped_session_rolls_back() {
    let mut conn = scratch_db();

    {
        let session = Session::begin(&mut conn).unwrap();
        session
            .execute("INSERT INTO scratch (value) VALUES ('orphan');", [])
            .unwrap();
    }

    assert_eq!(scratch_rows(&conn), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn panicking_unit_of_work_releases_session() {
    let mut conn = scratch_db();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        run_in_session(&mut conn, |session| -> Result<(), RepoError> {
            session
            .execute("INSERT INTO scratch (value) VALUES ('a');", [])
            .store_context(|| "insert scratch")?;
            panic!("unit of work crashed");
        })
    }));

    assert!(outcome.is_err());
    assert_eq!(scratch_rows(&conn), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn session_cannot_nest_inside_open_transaction() {
    let mut conn = scratch_db();
    conn.execute_batch("BEGIN;").unwrap();

    let err = Session::begin(&mut conn).err().unwrap();
    assert!(matches!(err, RepoError::Connection(_)));

    conn.execute_batch("ROLLBACK;").unwrap();
}
