//! Migration executor.
//!
//! A [`Migrator`] moves a database between versions of a
//! [`SealedRegistry`]. Each call resolves the current version, selects the
//! pending steps for the requested range, runs their actions in order, and
//! appends the reached version to the version table once every action has
//! succeeded.
//!
//! With `use_tx` the actions and the version write form one transaction. A
//! failed step triggers a rollback; if the rollback itself fails, that error
//! is returned in place of the step error. Without `use_tx` the actions run
//! straight on the connection: steps that succeeded before a failure keep
//! their effects, no version record is written, and the next call runs them
//! again. Actions used in that mode must tolerate being re-applied.
//!
//! The migrator takes no lock. Running two of them against the same database
//! at once is not safe.

use crate::error::{MigError, MigResult};
use crate::outcome::{MigrationFailure, MigrationOutcome, MigrationReport, MigrationStatus};
use crate::registry::SealedRegistry;
use crate::step::{Direction, MigrationStep};
use crate::version_store::VersionStore;
use mig_db::{Connection, Database, Transaction};

/// Applies registered steps against a connection.
#[derive(Debug)]
pub struct Migrator<'r> {
    registry: &'r SealedRegistry,
    store: VersionStore,
}

/// Progress through one batch.
struct Progress {
    frontier: i64,
    attempted: Option<i64>,
    applied: Vec<i64>,
}

impl<'r> Migrator<'r> {
    /// Create a migrator using the default version table.
    pub fn new(registry: &'r SealedRegistry) -> Self {
        Self {
            registry,
            store: VersionStore::default(),
        }
    }

    /// Use `store` for version bookkeeping.
    pub fn with_store(mut self, store: VersionStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn registry(&self) -> &SealedRegistry {
        self.registry
    }

    /// Run every pending up migration.
    pub fn up<C: Connection>(&self, conn: &C, use_tx: bool) -> MigrationOutcome {
        let old = self.resolve(conn)?;
        self.apply(conn, use_tx, Direction::Up, old, old, i64::MAX)
    }

    /// Roll back the single migration at the current version.
    pub fn down<C: Connection>(&self, conn: &C, use_tx: bool) -> MigrationOutcome {
        let old = self.resolve(conn)?;
        self.apply(conn, use_tx, Direction::Down, old, old.saturating_sub(1), old)
    }

    /// Migrate up or down until the database is at `target`.
    ///
    /// Being at `target` already is a successful no-op. Otherwise `target`
    /// must be a registered version.
    pub fn to_version<C: Connection>(&self, conn: &C, use_tx: bool, target: i64) -> MigrationOutcome {
        let old = self.resolve(conn)?;
        if old == target {
            log::debug!("Database already at version {target}");
            return Ok(MigrationReport::noop(old));
        }

        if !self.registry.contains(target) {
            return Err(MigrationFailure::before_apply(
                Some(old),
                MigError::NotFound { version: target },
            ));
        }

        if target > old {
            self.apply(conn, use_tx, Direction::Up, old, old, target)
        } else {
            self.apply(conn, use_tx, Direction::Down, old, target, old)
        }
    }

    /// Report the current version, pending steps, and version history.
    pub fn status(&self, db: &dyn Database) -> MigResult<MigrationStatus> {
        let current_version = self.store.current_version(db)?;
        let history = self.store.history(db)?;
        let pending = self
            .registry
            .versions()
            .into_iter()
            .filter(|v| *v > current_version)
            .collect();

        Ok(MigrationStatus {
            current_version,
            current_registered: current_version == 0 || self.registry.contains(current_version),
            latest_version: self.registry.latest_version(),
            pending,
            history,
        })
    }

    /// Steps with a version in `(lower, upper]`, ordered for `direction`.
    pub fn pending(&self, direction: Direction, lower: i64, upper: i64) -> Vec<&'r MigrationStep> {
        let in_range = |s: &&MigrationStep| s.version() > lower && s.version() <= upper;
        let sorted = self.registry.sorted_view().iter();
        match direction {
            Direction::Up => sorted.filter(in_range).collect(),
            Direction::Down => sorted.rev().filter(in_range).collect(),
        }
    }

    fn resolve(&self, db: &dyn Database) -> Result<i64, MigrationFailure> {
        self.store
            .current_version(db)
            .map_err(|e| MigrationFailure::before_apply(None, e))
    }

    fn apply<C: Connection>(
        &self,
        conn: &C,
        use_tx: bool,
        direction: Direction,
        old: i64,
        lower: i64,
        upper: i64,
    ) -> MigrationOutcome {
        let pending = self.pending(direction, lower, upper);
        if pending.is_empty() {
            return Err(MigrationFailure::before_apply(
                Some(old),
                MigError::NoWork {
                    direction,
                    from: old,
                },
            ));
        }

        log::debug!(
            "Running {} {direction} migration(s) on {}",
            pending.len(),
            conn.db_type()
        );

        let mut progress = Progress {
            frontier: old,
            attempted: None,
            applied: Vec::with_capacity(pending.len()),
        };

        let result = if use_tx {
            self.run_in_transaction(conn, direction, &pending, &mut progress)
        } else {
            self.run_unit(conn, direction, &pending, &mut progress)
                .map_err(|e| (e, false))
        };

        match result {
            Ok(()) => {
                log::info!(
                    "Migrated {direction} from version {old} to {} ({} step(s))",
                    progress.frontier,
                    progress.applied.len()
                );
                Ok(MigrationReport {
                    old_version: old,
                    new_version: progress.frontier,
                    direction: Some(direction),
                    applied: progress.applied,
                })
            }
            Err((error, rolled_back)) => {
                let failure = MigrationFailure {
                    old_version: Some(old),
                    reached_version: Some(if rolled_back { old } else { progress.frontier }),
                    attempted_version: progress.attempted,
                    applied: progress.applied,
                    rolled_back,
                    error,
                };
                if failure.has_unrecorded_effects() {
                    log::warn!(
                        "Migrations {:?} were applied without recording a version; \
                         they will run again on the next call",
                        failure.applied
                    );
                }
                Err(failure)
            }
        }
    }

    /// Run the unit inside one transaction. The error side carries whether
    /// the batch was rolled back.
    fn run_in_transaction<C: Connection>(
        &self,
        conn: &C,
        direction: Direction,
        pending: &[&MigrationStep],
        progress: &mut Progress,
    ) -> Result<(), (MigError, bool)> {
        let tx = Transaction::begin(conn).map_err(|source| {
            (
                MigError::Transaction {
                    operation: "begin",
                    source,
                },
                false,
            )
        })?;

        match self.run_unit(&tx, direction, pending, progress) {
            Ok(()) => tx.commit().map_err(|e| {
                let rolled_back = e.rolled_back();
                (
                    MigError::Persistence {
                        table: self.store.table_name().to_string(),
                        action: "commit",
                        source: e.error,
                    },
                    rolled_back,
                )
            }),
            Err(error) => match tx.rollback() {
                Ok(()) => Err((error, true)),
                Err(source) => {
                    log::warn!("Rollback failed; the step error was: {error}");
                    Err((
                        MigError::Transaction {
                            operation: "rollback",
                            source,
                        },
                        false,
                    ))
                }
            },
        }
    }

    /// Apply every pending step in order, then persist the frontier.
    fn run_unit(
        &self,
        db: &dyn Database,
        direction: Direction,
        pending: &[&MigrationStep],
        progress: &mut Progress,
    ) -> MigResult<()> {
        for step in pending {
            let version = step.version();
            progress.attempted = Some(version);
            log::debug!("Applying migration {direction} {version} ({})", step.label());

            step.apply(direction, db).map_err(|source| MigError::Step {
                version,
                direction,
                source,
            })?;

            progress.applied.push(version);
            progress.frontier = match direction {
                Direction::Up => version,
                Direction::Down => self.registry.previous_version(version),
            };
        }
        progress.attempted = None;

        self.store.set_version(db, progress.frontier)
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
