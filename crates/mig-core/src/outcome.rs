//! Results of migrator calls.

use crate::error::MigError;
use crate::step::Direction;
use crate::version_store::VersionRecord;
use serde::Serialize;
use std::fmt;

/// Outcome of one migrator call.
pub type MigrationOutcome = Result<MigrationReport, MigrationFailure>;

/// A completed call: the database moved from `old_version` to `new_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub old_version: i64,
    pub new_version: i64,
    /// `None` when the call was a no-op (already at the target)
    pub direction: Option<Direction>,
    /// Versions whose actions ran, in application order
    pub applied: Vec<i64>,
}

impl MigrationReport {
    pub(crate) fn noop(version: i64) -> Self {
        Self {
            old_version: version,
            new_version: version,
            direction: None,
            applied: Vec::new(),
        }
    }

    /// Whether no migration action ran.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A failed call, with the partial state reached before the failure.
///
/// In transactional mode a successful rollback leaves the database at
/// `old_version` and `rolled_back` is set. In non-transactional mode the
/// actions listed in `applied` stay in effect but no version record was
/// written, so the next call re-applies them.
#[derive(Debug)]
pub struct MigrationFailure {
    /// `None` if the current version could not be read
    pub old_version: Option<i64>,
    /// Position the surviving effects correspond to
    pub reached_version: Option<i64>,
    /// Step being applied when the failure happened
    pub attempted_version: Option<i64>,
    /// Versions whose actions succeeded during this call
    pub applied: Vec<i64>,
    pub rolled_back: bool,
    pub error: MigError,
}

impl MigrationFailure {
    /// Failure before any step ran: nothing applied, nothing to roll back.
    pub(crate) fn before_apply(old_version: Option<i64>, error: MigError) -> Self {
        Self {
            old_version,
            reached_version: old_version,
            attempted_version: None,
            applied: Vec::new(),
            rolled_back: false,
            error,
        }
    }

    /// Whether effects of this call remain in the database without a
    /// matching version record.
    pub fn has_unrecorded_effects(&self) -> bool {
        !self.rolled_back && !self.applied.is_empty()
    }
}

impl fmt::Display for MigrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.old_version {
            Some(old) => write!(f, "migration from version {old} failed")?,
            None => write!(f, "unable to resolve the current version")?,
        }
        if let Some(attempted) = self.attempted_version {
            write!(f, " at version {attempted}")?;
        }
        if self.rolled_back {
            write!(f, "; transaction was rolled back")?;
        }
        Ok(())
    }
}

impl std::error::Error for MigrationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Snapshot of where a database stands relative to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub current_version: i64,
    /// Whether the current version is a registered step (or 0)
    pub current_registered: bool,
    pub latest_version: i64,
    /// Registered versions above the current one, ascending
    pub pending: Vec<i64>,
    /// Version records, newest first
    pub history: Vec<VersionRecord>,
}
