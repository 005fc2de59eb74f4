//! Statement helpers for migration authors.

use crate::error::DbResult;
use crate::traits::Database;

/// Execute every statement in order, stopping at the first failure.
///
/// Handy for the usual run of `CREATE TABLE` statements in an up action.
pub fn exec_all(db: &dyn Database, stmts: &[&str]) -> DbResult<()> {
    for stmt in stmts {
        db.execute(stmt)?;
    }
    Ok(())
}

/// Drop each table in the given order, stopping at the first failure.
pub fn drop_all(db: &dyn Database, tables: &[&str]) -> DbResult<()> {
    for table in tables {
        db.execute(&format!("DROP TABLE {table}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DuckDbBackend;

    #[test]
    fn test_exec_all_runs_in_order() {
        let db = DuckDbBackend::in_memory().unwrap();
        exec_all(
            &db,
            &[
                "CREATE TABLE users (id INTEGER)",
                "INSERT INTO users VALUES (1)",
                "INSERT INTO users VALUES (2)",
            ],
        )
        .unwrap();

        assert_eq!(
            db.query_i64("SELECT COUNT(*) FROM users").unwrap(),
            Some(2)
        );
    }

    #[test]
    fn test_exec_all_stops_at_first_failure() {
        let db = DuckDbBackend::in_memory().unwrap();
        let result = exec_all(
            &db,
            &[
                "CREATE TABLE a (id INTEGER)",
                "INSERT INTO missing VALUES (1)",
                "CREATE TABLE b (id INTEGER)",
            ],
        );

        assert!(result.is_err());
        assert!(db.relation_exists("a").unwrap());
        assert!(!db.relation_exists("b").unwrap());
    }

    #[test]
    fn test_drop_all() {
        let db = DuckDbBackend::in_memory().unwrap();
        exec_all(&db, &["CREATE TABLE a (id INTEGER)", "CREATE TABLE b (id INTEGER)"]).unwrap();

        drop_all(&db, &["b", "a"]).unwrap();

        assert!(!db.relation_exists("a").unwrap());
        assert!(!db.relation_exists("b").unwrap());
    }

    #[test]
    fn test_drop_all_missing_table_fails() {
        let db = DuckDbBackend::in_memory().unwrap();
        assert!(drop_all(&db, &["nope"]).is_err());
    }
}
