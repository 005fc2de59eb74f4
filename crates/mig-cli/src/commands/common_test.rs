use super::*;
use mig_core::{MigError, MigrationReport};
use std::fs;
use tempfile::tempdir;

fn global_in(dir: &std::path::Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.to_path_buf(),
        config: None,
    }
}

// ── Settings and URLs ──────────────────────────────────────────────────

#[test]
fn load_settings_defaults_without_config_file() {
    let dir = tempdir().unwrap();
    let settings = load_settings(&global_in(dir.path())).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn load_settings_honours_config_override() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.yml");
    fs::write(&path, "table_name: schema_history\n").unwrap();

    let mut global = global_in(dir.path());
    global.config = Some(path);

    let settings = load_settings(&global).unwrap();
    assert_eq!(settings.table_name, "schema_history");
}

#[test]
fn load_settings_missing_override_fails() {
    let dir = tempdir().unwrap();
    let mut global = global_in(dir.path());
    global.config = Some(dir.path().join("nope.yml"));

    let err = load_settings(&global).unwrap_err();
    assert!(format!("{err:#}").contains("[S001]"));
}

#[test]
fn database_url_precedence() {
    let mut settings = Settings::default();
    let none = DatabaseArgs { url: None };
    assert!(resolve_database_url(&none, &settings).is_err());

    settings.database_url = Some("from_config.duckdb".to_string());
    assert_eq!(
        resolve_database_url(&none, &settings).unwrap(),
        "from_config.duckdb"
    );

    let flag = DatabaseArgs {
        url: Some("from_flag.duckdb".to_string()),
    };
    assert_eq!(
        resolve_database_url(&flag, &settings).unwrap(),
        "from_flag.duckdb"
    );
}

#[test]
fn open_connection_rejects_foreign_scheme() {
    let err = open_connection("postgres://localhost/db").unwrap_err();
    assert!(format!("{err:#}").contains("postgres://localhost/db"));
}

#[test]
fn session_uses_configured_table() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("mig.yml"),
        "table_name: history\ndatabase_url: \":memory:\"\n",
    )
    .unwrap();

    let session = Session::open(&DatabaseArgs::default(), &global_in(dir.path())).unwrap();
    assert_eq!(session.store.table_name(), "history");
}

// ── Reporting ──────────────────────────────────────────────────────────

fn failure(error: MigError) -> MigrationFailure {
    MigrationFailure {
        old_version: Some(1),
        reached_version: Some(1),
        attempted_version: None,
        applied: Vec::new(),
        rolled_back: false,
        error,
    }
}

#[test]
fn report_success_and_same_version() {
    let moved = MigrationReport {
        old_version: 0,
        new_version: 3,
        direction: Some(mig_core::Direction::Up),
        applied: vec![1, 2, 3],
    };
    assert!(report(Ok(moved)).is_ok());

    let same = MigrationReport {
        old_version: 2,
        new_version: 2,
        direction: None,
        applied: Vec::new(),
    };
    assert!(report(Ok(same)).is_ok());
}

#[test]
fn report_no_work_is_not_an_error() {
    let no_work = failure(MigError::NoWork {
        direction: mig_core::Direction::Up,
        from: 1,
    });
    assert!(report(Err(no_work)).is_ok());
}

#[test]
fn report_other_failures_exit_with_one() {
    let not_found = failure(MigError::NotFound { version: 9 });
    let err = report(Err(not_found)).unwrap_err();
    assert_eq!(err.downcast_ref::<ExitCode>().unwrap().0, 1);
}

#[test]
fn describe_failure_includes_chain_and_partial_state() {
    let mut f = failure(MigError::Step {
        version: 3,
        direction: mig_core::Direction::Up,
        source: mig_db::DbError::custom("boom"),
    });
    f.old_version = Some(1);
    f.reached_version = Some(2);
    f.attempted_version = Some(3);
    f.applied = vec![2];

    let text = describe_failure(&f);
    assert!(text.starts_with("Error: migration from version 1 failed at version 3"));
    assert!(text.contains("caused by: [M003]"));
    assert!(text.contains("caused by: [D007] boom"));
    assert!(text.contains(
        "migrations [2] were applied without a version record: the schema reflects \
         version 2, the version table still records version 1"
    ));
}
