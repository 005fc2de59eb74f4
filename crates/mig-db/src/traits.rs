//! Execution-context traits

use crate::error::DbResult;

/// Something capable of running statements.
///
/// Both a plain connection and an open [`Transaction`](crate::Transaction)
/// implement this, so migration actions are written once and run in either
/// mode.
pub trait Database {
    /// Execute a single SQL statement, returning the number of affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple `;`-separated SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Return the first column of the first row as an integer, or `None`
    /// when the query yields no rows
    fn query_i64(&self, sql: &str) -> DbResult<Option<i64>>;

    /// Return the first two columns of every row as integer pairs
    fn query_i64_pairs(&self, sql: &str) -> DbResult<Vec<(i64, i64)>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// A database connection that can open transactions.
///
/// The transaction methods are the raw control statements. Callers normally
/// go through [`Transaction::begin`](crate::Transaction::begin), which pairs
/// them up and rolls back on drop.
pub trait Connection: Database {
    /// Start a transaction on this connection
    fn begin_transaction(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit_transaction(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback_transaction(&self) -> DbResult<()>;
}
