//! Tests for the version table.

use super::*;
use mig_db::DuckDbBackend;

fn insert_raw(db: &DuckDbBackend, version: i64, applied_at: i64) {
    db.execute(&format!(
        "INSERT INTO __version (version, applied_at) VALUES ({version}, {applied_at})"
    ))
    .unwrap();
}

#[test]
fn fresh_database_is_version_zero() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();

    assert_eq!(store.current_version(&db).unwrap(), 0);
    assert!(db.relation_exists("__version").unwrap());
}

#[test]
fn ensure_table_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();

    store.ensure_table(&db).unwrap();
    store.ensure_table(&db).unwrap();
    store.set_version(&db, 4).unwrap();
    store.ensure_table(&db).unwrap();

    assert_eq!(store.current_version(&db).unwrap(), 4);
}

#[test]
fn set_version_appends_records() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();

    store.set_version(&db, 1).unwrap();
    store.set_version(&db, 2).unwrap();
    store.set_version(&db, 3).unwrap();

    assert_eq!(
        db.query_i64("SELECT COUNT(*) FROM __version").unwrap(),
        Some(3)
    );
    assert_eq!(store.current_version(&db).unwrap(), 3);
}

#[test]
fn current_version_follows_latest_record_not_max() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();

    store.set_version(&db, 5).unwrap();
    store.set_version(&db, 2).unwrap();

    assert_eq!(store.current_version(&db).unwrap(), 2);

    let history = store.history(&db).unwrap();
    let versions: Vec<i64> = history.iter().map(|r| r.version).collect();
    assert_eq!(versions, vec![2, 5]);
    assert!(history[0].applied_at > history[1].applied_at);
}

#[test]
fn current_version_orders_by_time_not_insertion() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();
    store.ensure_table(&db).unwrap();

    // Inserted last, but carries the oldest timestamp.
    insert_raw(&db, 3, 300);
    insert_raw(&db, 7, 100);

    assert_eq!(store.current_version(&db).unwrap(), 3);
}

#[test]
fn set_version_after_future_timestamp_still_wins() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();
    store.ensure_table(&db).unwrap();

    // A record stamped far in the future, e.g. written under clock skew.
    let future = chrono::Utc::now().timestamp_micros() + 3_600_000_000;
    insert_raw(&db, 9, future);

    store.set_version(&db, 4).unwrap();

    assert_eq!(store.current_version(&db).unwrap(), 4);
    let history = store.history(&db).unwrap();
    assert_eq!(history[0].applied_at, future + 1);
}

#[test]
fn custom_schema_qualified_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new("meta.schema_history");

    assert_eq!(store.current_version(&db).unwrap(), 0);
    store.set_version(&db, 2).unwrap();

    assert!(db.relation_exists("meta.schema_history").unwrap());
    assert!(!db.relation_exists("__version").unwrap());
    assert_eq!(store.current_version(&db).unwrap(), 2);
    assert_eq!(store.table_name(), "meta.schema_history");
}

#[test]
fn try_new_rejects_invalid_names() {
    assert!(VersionStore::try_new("ok_name").is_some());
    assert!(VersionStore::try_new("bad name").is_none());
    assert!(VersionStore::try_new("x; DROP TABLE y").is_none());
}

#[test]
#[should_panic(expected = "invalid version table name")]
fn new_panics_on_invalid_name() {
    let _ = VersionStore::new("not valid");
}

#[test]
fn read_failure_is_persistence_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    // A pre-existing table of the wrong shape: creation is skipped and the
    // read hits columns that do not exist.
    db.execute_batch("CREATE TABLE __version (other INTEGER)").unwrap();
    let store = VersionStore::default();

    let err = store.current_version(&db).unwrap_err();
    assert!(
        matches!(
            err,
            MigError::Persistence {
                action: "read current version",
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn history_of_fresh_database_is_empty() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();
    assert!(store.history(&db).unwrap().is_empty());
}

#[test]
fn set_version_after_maximal_timestamp_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::default();
    store.ensure_table(&db).unwrap();
    insert_raw(&db, 9, i64::MAX);

    let err = store.set_version(&db, 4).unwrap_err();

    assert!(
        matches!(
            err,
            MigError::Persistence {
                action: "record version",
                ..
            }
        ),
        "got {err:?}"
    );
    assert_eq!(store.current_version(&db).unwrap(), 9);
}
