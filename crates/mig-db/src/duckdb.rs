//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Connection as MigConnection, Database};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// URL scheme accepted by [`DuckDbBackend::from_url`].
const URL_SCHEME: &str = "duckdb://";

/// DuckDB database backend
#[derive(Debug)]
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path.is_empty() || path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open a connection from a URL of the form `duckdb://<path>`.
    ///
    /// A bare path or `:memory:` is accepted as well.
    pub fn from_url(url: &str) -> DbResult<Self> {
        let path = url.strip_prefix(URL_SCHEME).unwrap_or(url);
        if path.contains("://") {
            return Err(DbError::ConnectionError(format!(
                "unsupported database url '{url}': expected {URL_SCHEME}<path>, a path, or :memory:"
            )));
        }
        Self::new(path)
    }

    /// Check whether a table or view exists (schema-qualified names allowed)
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rsplit_once('.') {
            Some((schema, table)) => (schema, table),
            None => ("main", name),
        };

        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn control(&self, operation: &'static str, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError {
                operation,
                message: e.to_string(),
            })
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    fn query_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        // A NULL (e.g. MAX over an empty table) reads as no value.
        let value = match rows.next()? {
            Some(row) => row.get::<_, Option<i64>>(0)?,
            None => None,
        };
        Ok(value)
    }

    fn query_i64_pairs(&self, sql: &str) -> DbResult<Vec<(i64, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut pairs = Vec::new();
        while let Some(row) = rows.next()? {
            pairs.push((row.get(0)?, row.get(1)?));
        }
        Ok(pairs)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

impl MigConnection for DuckDbBackend {
    fn begin_transaction(&self) -> DbResult<()> {
        self.control("BEGIN", "BEGIN TRANSACTION")
    }

    fn commit_transaction(&self) -> DbResult<()> {
        self.control("COMMIT", "COMMIT")
    }

    fn rollback_transaction(&self) -> DbResult<()> {
        self.control("ROLLBACK", "ROLLBACK")
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
