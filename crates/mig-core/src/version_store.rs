//! Version table: an append-only log of version transitions.
//!
//! Every successful batch appends `{version, applied_at}`; nothing is ever
//! updated or deleted. The current version is the one with the latest
//! `applied_at` rather than the numerically largest, so moving back to an
//! older version and forward again is reflected faithfully.

use crate::error::{MigError, MigResult};
use crate::settings::is_valid_table_name;
use mig_db::{Database, DbError};
use serde::Serialize;

/// Default name of the version table.
pub const DEFAULT_TABLE_NAME: &str = "__version";

/// One row of the version table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: i64,
    /// Microseconds since the Unix epoch
    pub applied_at: i64,
}

/// Reads and appends version records in a named table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStore {
    table: String,
}

impl Default for VersionStore {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl VersionStore {
    /// Create a store over `table`, panicking if it is not a valid identifier.
    ///
    /// Prefer [`try_new`](Self::try_new) when the name comes from user input.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert!(
            is_valid_table_name(&table),
            "invalid version table name '{table}'"
        );
        Self { table }
    }

    /// Create a store over `table`, returning `None` if the name is invalid.
    pub fn try_new(table: impl Into<String>) -> Option<Self> {
        let table = table.into();
        is_valid_table_name(&table).then_some(Self { table })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Create the version table (and its schema) if absent.
    pub fn ensure_table(&self, db: &dyn Database) -> MigResult<()> {
        let mut sql = String::new();
        if let Some((schema, _)) = self.table.split_once('.') {
            sql.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {schema};\n"));
        }
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 version    BIGINT NOT NULL,
                 applied_at BIGINT NOT NULL
             );",
            self.table
        ));
        db.execute_batch(&sql)
            .map_err(|e| self.persistence("create table", e))
    }

    /// The version of the most recently applied record, or 0 for a fresh
    /// database.
    pub fn current_version(&self, db: &dyn Database) -> MigResult<i64> {
        self.ensure_table(db)?;
        let version = db
            .query_i64(&format!(
                "SELECT version FROM {} ORDER BY applied_at DESC LIMIT 1",
                self.table
            ))
            .map_err(|e| self.persistence("read current version", e))?;
        Ok(version.unwrap_or(0))
    }

    /// Append a record marking the database as being at `version`.
    ///
    /// `applied_at` is the current time, bumped past the latest existing
    /// record if the clock has not advanced, so the new record is always the
    /// current one.
    pub fn set_version(&self, db: &dyn Database, version: i64) -> MigResult<()> {
        self.ensure_table(db)?;
        let latest = db
            .query_i64(&format!("SELECT MAX(applied_at) FROM {}", self.table))
            .map_err(|e| self.persistence("read latest timestamp", e))?;

        let now = chrono::Utc::now().timestamp_micros();
        let applied_at = match latest {
            Some(latest) if latest >= now => latest.checked_add(1).ok_or_else(|| {
                self.persistence(
                    "record version",
                    DbError::custom(format!("latest applied_at {latest} cannot be exceeded")),
                )
            })?,
            _ => now,
        };

        db.execute(&format!(
            "INSERT INTO {} (version, applied_at) VALUES ({version}, {applied_at})",
            self.table
        ))
        .map_err(|e| self.persistence("record version", e))?;
        log::debug!("Recorded version {version} in {}", self.table);
        Ok(())
    }

    /// All records, newest first.
    pub fn history(&self, db: &dyn Database) -> MigResult<Vec<VersionRecord>> {
        self.ensure_table(db)?;
        let rows = db
            .query_i64_pairs(&format!(
                "SELECT version, applied_at FROM {} ORDER BY applied_at DESC",
                self.table
            ))
            .map_err(|e| self.persistence("read history", e))?;
        Ok(rows
            .into_iter()
            .map(|(version, applied_at)| VersionRecord {
                version,
                applied_at,
            })
            .collect())
    }

    fn persistence(&self, action: &'static str, source: DbError) -> MigError {
        MigError::Persistence {
            table: self.table.clone(),
            action,
            source,
        }
    }
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
