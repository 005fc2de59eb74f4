//! Migration steps and their actions.

use crate::error::ConfigurationError;
use mig_db::{Database, DbResult};
use std::fmt;

/// A directional migration action.
///
/// Receives whatever execution context the migrator is running against: the
/// plain connection, or the open transaction in atomic mode.
pub type Action = Box<dyn Fn(&dyn Database) -> DbResult<()> + Send + Sync>;

/// Direction a step is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A registered, immutable migration step.
pub struct MigrationStep {
    version: i64,
    label: String,
    up: Action,
    down: Action,
}

impl MigrationStep {
    /// Start building a step for `version`, declared by `label`.
    pub fn builder(version: i64, label: impl Into<String>) -> StepBuilder {
        StepBuilder {
            version,
            label: label.into(),
            up: None,
            down: None,
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Provenance of the step, usually its source file name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the action for `direction` against `db`.
    pub fn apply(&self, direction: Direction, db: &dyn Database) -> DbResult<()> {
        match direction {
            Direction::Up => (self.up)(db),
            Direction::Down => (self.down)(db),
        }
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("version", &self.version)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`MigrationStep`].
///
/// Both actions are required; [`build`](Self::build) reports whichever is
/// missing. Registration validates the version and label.
pub struct StepBuilder {
    pub(crate) version: i64,
    pub(crate) label: String,
    up: Option<Action>,
    down: Option<Action>,
}

impl StepBuilder {
    /// Set the up action.
    pub fn up<F>(mut self, action: F) -> Self
    where
        F: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
    {
        self.up = Some(Box::new(action));
        self
    }

    /// Set the down action.
    pub fn down<F>(mut self, action: F) -> Self
    where
        F: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
    {
        self.down = Some(Box::new(action));
        self
    }

    /// Finish the step, failing if either action is absent.
    pub fn build(self) -> Result<MigrationStep, ConfigurationError> {
        let Some(up) = self.up else {
            return Err(ConfigurationError::MissingAction {
                label: self.label,
                direction: Direction::Up,
            });
        };
        let Some(down) = self.down else {
            return Err(ConfigurationError::MissingAction {
                label: self.label,
                direction: Direction::Down,
            });
        };
        Ok(MigrationStep {
            version: self.version,
            label: self.label,
            up,
            down,
        })
    }
}
