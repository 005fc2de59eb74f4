//! Error types for mig-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Transaction control statement failed (D004)
    #[error("[D004] Transaction {operation} failed: {message}")]
    TransactionError {
        operation: &'static str,
        message: String,
    },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Failure raised by a migration action itself rather than the driver (D007)
    #[error("[D007] {0}")]
    Custom(String),
}

/// A failed COMMIT and the outcome of the rollback issued after it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct CommitError {
    #[source]
    pub error: DbError,
    /// Set when the follow-up rollback failed too
    pub rollback_error: Option<DbError>,
}

impl CommitError {
    /// Whether the transaction's effects were discarded.
    pub fn rolled_back(&self) -> bool {
        self.rollback_error.is_none()
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Build a [`DbError::Custom`] from any message.
    ///
    /// Intended for migration actions that fail for reasons of their own,
    /// e.g. a data check that does not hold.
    pub fn custom(message: impl Into<String>) -> Self {
        DbError::Custom(message.into())
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog
        // lookups, so classification goes by message text.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
