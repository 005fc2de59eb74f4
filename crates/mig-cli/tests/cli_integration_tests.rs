//! End-to-end tests driving the manager and the `mig` tool through their
//! argument parsers.

use mig_core::{Registry, SealedRegistry, VersionStore};
use mig_db::DuckDbBackend;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// ── Helpers ────────────────────────────────────────────────────────────

fn registry() -> SealedRegistry {
    let mut registry = Registry::new();
    registry
        .register_sql(
            1,
            "0001_create_users.rs",
            "CREATE TABLE users (id INTEGER)",
            "DROP TABLE users",
        )
        .register_sql(
            2,
            "0002_create_posts.rs",
            "CREATE TABLE posts (id INTEGER, user_id INTEGER)",
            "DROP TABLE posts",
        )
        .register_sql(
            3,
            "0003_create_likes.rs",
            "CREATE TABLE likes (post_id INTEGER)",
            "DROP TABLE likes",
        );
    registry.seal()
}

fn current_version(db_path: &Path) -> i64 {
    let db = DuckDbBackend::from_path(db_path).unwrap();
    VersionStore::default().current_version(&db).unwrap()
}

fn manager(registry: &SealedRegistry, db_path: &Path, args: &[&str]) -> anyhow::Result<()> {
    let url = db_path.display().to_string();
    let mut argv = vec!["migrate"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&["--url", &url]);
    mig_cli::run_from(registry, argv)
}

// ── Manager ────────────────────────────────────────────────────────────

#[test]
fn manager_up_rollback_to_version() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("app.duckdb");
    let registry = registry();

    manager(&registry, &db_path, &["up"]).unwrap();
    assert_eq!(current_version(&db_path), 3);

    manager(&registry, &db_path, &["rollback"]).unwrap();
    assert_eq!(current_version(&db_path), 2);

    manager(&registry, &db_path, &["to-version", "1", "--no-tx"]).unwrap();
    assert_eq!(current_version(&db_path), 1);

    manager(&registry, &db_path, &["status", "--output", "json"]).unwrap();
    manager(&registry, &db_path, &["status"]).unwrap();
}

#[test]
fn manager_no_work_is_success() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("app.duckdb");
    let registry = registry();

    manager(&registry, &db_path, &["down"]).unwrap();
    manager(&registry, &db_path, &["up"]).unwrap();
    manager(&registry, &db_path, &["up"]).unwrap();
    manager(&registry, &db_path, &["to-version", "3"]).unwrap();
    assert_eq!(current_version(&db_path), 3);
}

#[test]
fn manager_unknown_version_fails() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("app.duckdb");

    assert!(manager(&registry(), &db_path, &["to-version", "9"]).is_err());
    assert_eq!(current_version(&db_path), 0);
}

#[test]
fn manager_usage_error_fails() {
    let registry = registry();
    assert!(mig_cli::run_from(&registry, ["migrate", "sideways"]).is_err());
}

#[test]
fn manager_help_is_success() {
    let registry = registry();
    assert!(mig_cli::run_from(&registry, ["migrate", "--help"]).is_ok());
}

// ── mig tool ───────────────────────────────────────────────────────────

#[test]
fn tool_new_then_scaffold() {
    let dir = tempdir().unwrap();
    let project = dir.path().display().to_string();

    mig_cli::run_tool_from(["mig", "new", "create_users", "-p", &project]).unwrap();
    mig_cli::run_tool_from(["mig", "new", "add_email", "-p", &project]).unwrap();

    let migrations = dir.path().join("migrations");
    assert!(migrations.join("0001_create_users.rs").exists());
    assert!(migrations.join("0002_add_email.rs").exists());

    mig_cli::run_tool_from(["mig", "scaffold", "-p", &project]).unwrap();
    let cmdfile = fs::read_to_string(dir.path().join("src/bin/migrate.rs")).unwrap();
    assert!(cmdfile.contains("#[path = \"../../migrations/mod.rs\"]"));

    // A second scaffold must not clobber the first.
    assert!(mig_cli::run_tool_from(["mig", "scaffold", "-p", &project]).is_err());
}

#[test]
fn tool_new_with_folder() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("db").join("migrations");
    let folder_arg = folder.display().to_string();

    mig_cli::run_tool_from(["mig", "new", "init", "--folder", &folder_arg]).unwrap();
    assert!(folder.join("0001_init.rs").exists());
}

#[test]
fn tool_new_rejects_bad_name() {
    let dir = tempdir().unwrap();
    let project = dir.path().display().to_string();
    assert!(mig_cli::run_tool_from(["mig", "new", "bad name", "-p", &project]).is_err());
}
