//! Transaction handle over a [`Connection`].

use crate::error::{CommitError, DbResult};
use crate::traits::{Connection, Database};

/// An open transaction on a borrowed connection.
///
/// Statements issued through the handle run inside the transaction. The
/// transaction ends with an explicit [`commit`](Self::commit) or
/// [`rollback`](Self::rollback); if the handle is dropped while still open,
/// it is rolled back and any rollback error is logged.
pub struct Transaction<'c, C: Connection + ?Sized> {
    conn: &'c C,
    open: bool,
}

impl<'c, C: Connection + ?Sized> Transaction<'c, C> {
    /// Begin a transaction on `conn`.
    pub fn begin(conn: &'c C) -> DbResult<Self> {
        conn.begin_transaction()?;
        Ok(Self { conn, open: true })
    }

    /// Commit the transaction.
    ///
    /// If the commit fails the handle is already consumed, so a rollback is
    /// issued right away; its outcome is carried in the returned
    /// [`CommitError`].
    pub fn commit(mut self) -> Result<(), CommitError> {
        self.open = false;
        let Err(error) = self.conn.commit_transaction() else {
            return Ok(());
        };
        let rollback_error = self.conn.rollback_transaction().err();
        if let Some(e) = &rollback_error {
            log::warn!("Rollback after failed commit failed: {e}");
        }
        Err(CommitError {
            error,
            rollback_error,
        })
    }

    /// Roll the transaction back.
    pub fn rollback(mut self) -> DbResult<()> {
        self.open = false;
        self.conn.rollback_transaction()
    }
}

impl<C: Connection + ?Sized> Database for Transaction<'_, C> {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.conn.execute(sql)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql)
    }

    fn query_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        self.conn.query_i64(sql)
    }

    fn query_i64_pairs(&self, sql: &str) -> DbResult<Vec<(i64, i64)>> {
        self.conn.query_i64_pairs(sql)
    }

    fn db_type(&self) -> &'static str {
        self.conn.db_type()
    }
}

impl<C: Connection + ?Sized> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.rollback_transaction() {
                log::warn!("Rollback of abandoned transaction failed: {e}");
            }
        }
    }
}
