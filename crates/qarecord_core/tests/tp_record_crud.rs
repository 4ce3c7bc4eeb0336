use qarecord_core::db::open_db_in_memory;
use qarecord_core::{
    RecordType, RepoError, SqliteTpRecordRepository, StoreFault, TestTotals, TpRecord,
    TpRecordRepository,
};

fn sample_record(app_id: i64, commit_id: &str) -> TpRecord {
    let mut record = TpRecord::new(app_id, "unit tests", RecordType::Unit);
    record.app_name = "order-service".to_string();
    record.project_id = 3;
    record.uuid = "0b6f1c2e-report".to_string();
    record.branch = "feature/checkout".to_string();
    record.git_repo = "https://git.example.com/shop/order-service".to_string();
    record.commit_id = Some(commit_id.to_string());
    record.operator_id = "1001".to_string();
    record.operator_name = "ci-bot".to_string();
    record.totals = TestTotals {
        tests: 42,
        duration_ms: 1_500,
        passed: 40,
        failed: 1,
        skipped: 1,
        errored: 0,
    };
    record.parser_type = "JUNIT".to_string();
    record.workspace = "TEST".to_string();
    record
}

#[test]
fn insert_then_find_by_id_roundtrips_all_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let record = sample_record(7, "a1b2c3");
    let stored = repo.insert(&record).unwrap();
    assert!(stored.is_persisted());
    assert!(stored.created_at > 0);
    assert!(stored.updated_at > 0);

    let loaded = repo.find_by_id(stored.id).unwrap();
    assert_eq!(loaded, stored);

    let expected = TpRecord {
        id: loaded.id,
        created_at: loaded.created_at,
        updated_at: loaded.updated_at,
        ..record
    };
    assert_eq!(loaded, expected);
}

#[test]
fn insert_keeps_caller_supplied_timestamps() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let mut record = sample_record(7, "c0ffee");
    record.created_at = 1_700_000_000_000;
    record.updated_at = 1_700_000_000_500;
    let stored = repo.insert(&record).unwrap();

    let loaded = repo.find_by_id(stored.id).unwrap();
    assert_eq!(loaded.created_at, 1_700_000_000_000);
    assert_eq!(loaded.updated_at, 1_700_000_000_500);
}

#[test]
fn insert_assigns_increasing_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let first = repo.insert(&sample_record(1, "a")).unwrap();
    let second = repo.insert(&sample_record(1, "b")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn keyed_lookups_on_empty_store_are_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let by_id = repo.find_by_id(1).unwrap_err();
    assert!(by_id.is_not_found());
    assert!(matches!(
        by_id,
        RepoError::NotFound { entity: "tp record", ref key } if key == "id=1"
    ));

    let by_commit = repo.find_by_commit_id("deadbeef").unwrap_err();
    assert!(by_commit.is_not_found());
}

#[test]
fn find_by_commit_id_returns_newest_match() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    repo.insert(&sample_record(7, "shared")).unwrap();
    let mut newer = sample_record(7, "shared");
    newer.record_type = RecordType::Integration;
    let newer = repo.insert(&newer).unwrap();
    repo.insert(&sample_record(7, "other")).unwrap();

    let found = repo.find_by_commit_id("shared").unwrap();
    assert_eq!(found.id, newer.id);
    assert_eq!(found.record_type, RecordType::Integration);
}

#[test]
fn records_without_commit_id_are_not_matched_by_commit_lookup() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let mut record = sample_record(7, "unused");
    record.commit_id = None;
    let stored = repo.insert(&record).unwrap();

    assert_eq!(repo.find_by_id(stored.id).unwrap().commit_id, None);
    assert!(repo.find_by_commit_id("").unwrap_err().is_not_found());
}

#[test]
fn silently_dropped_insert_is_a_store_error() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER drop_all_tp_records
         BEFORE INSERT ON tp_records
         BEGIN
             SELECT RAISE(IGNORE);
         END;",
    )
    .unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();

    let err = repo.insert(&sample_record(7, "lost")).unwrap_err();
    match err {
        RepoError::Store {
            context,
            fault: StoreFault::AffectedRows { expected, actual },
        } => {
            assert!(context.contains("insert tp record"));
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_row_is_invalid_data_not_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();
    let stored = repo.insert(&sample_record(7, "broken")).unwrap();
    drop(repo);

    conn.execute(
        "UPDATE tp_records SET type = 'IT', totals = 'not json' WHERE id = ?1;",
        [stored.id],
    )
    .unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();
    let err = repo.find_by_id(stored.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(!err.is_not_found());
}

#[test]
fn missing_table_read_carries_operation_context() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();
    drop(repo);
    conn.execute_batch("ALTER TABLE tp_records RENAME TO tp_records_old;")
        .unwrap();
    conn.execute_batch("CREATE TABLE tp_records (id INTEGER PRIMARY KEY);")
        .unwrap();

    let repo = SqliteTpRecordRepository::try_new(&mut conn).unwrap();
    let err = repo.find_by_commit_id("abc").unwrap_err();
    match err {
        RepoError::Store {
            context,
            fault: StoreFault::Db(_),
        } => assert_eq!(context, "find tp record by commit_id=abc"),
        other => panic!("unexpected error: {other}"),
    }
}
