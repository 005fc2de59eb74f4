//! Error types for mig-core

use crate::step::Direction;
use mig_db::DbError;
use thiserror::Error;

/// Registration-time invariant violations.
///
/// These describe programming mistakes in the set of migrations a host
/// registers. [`Registry::register`](crate::Registry::register) panics with
/// them; they never come back from an execution call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// C001: An up or down action was not supplied
    #[error("[C001] Migration '{label}' is missing its {direction} action")]
    MissingAction { label: String, direction: Direction },

    /// C002: Version is zero or negative
    #[error("[C002] Version {version} in '{label}' is not valid, it must be bigger than 0")]
    NonPositiveVersion { version: i64, label: String },

    /// C003: Another migration already uses this version
    #[error("[C003] Migration with number {version} has already been registered in '{existing}'")]
    DuplicateVersion { version: i64, existing: String },

    /// C004: Label is not of the form NUMBER_NAME.EXT
    #[error("[C004] Migration label '{label}' is malformed: {reason}")]
    MalformedLabel { label: String, reason: String },

    /// C005: Label number and declared version disagree
    #[error("[C005] Migration '{label}' declares version {declared} but its name says {parsed}")]
    VersionMismatch {
        label: String,
        declared: i64,
        parsed: i64,
    },

    /// C006: Registry has no expected extension to check labels against
    #[error("[C006] Invalid migration file extension '{extension}'")]
    InvalidExtension { extension: String },
}

/// Execution-time errors returned by the [`Migrator`](crate::Migrator).
#[derive(Error, Debug)]
pub enum MigError {
    /// M001: Target version is not registered
    #[error("[M001] Unable to find a migration with version {version}")]
    NotFound { version: i64 },

    /// M002: Pending set is empty
    #[error("[M002] No migrations to run {direction} from version {from}")]
    NoWork { direction: Direction, from: i64 },

    /// M003: A migration action failed
    #[error("[M003] Error applying migration {direction} {version}")]
    Step {
        version: i64,
        direction: Direction,
        #[source]
        source: DbError,
    },

    /// M004: Begin or rollback failed
    #[error("[M004] Transaction {operation} failed")]
    Transaction {
        operation: &'static str,
        #[source]
        source: DbError,
    },

    /// M005: Reading or writing the version table failed
    #[error("[M005] Version table '{table}': {action} failed")]
    Persistence {
        table: String,
        action: &'static str,
        #[source]
        source: DbError,
    },
}

/// Result type alias for [`MigError`].
pub type MigResult<T> = Result<T, MigError>;

impl MigError {
    /// Version of the step that failed, for [`MigError::Step`].
    pub fn failed_version(&self) -> Option<i64> {
        match self {
            MigError::Step { version, .. } => Some(*version),
            _ => None,
        }
    }

    /// Whether this is the empty-pending-set error.
    pub fn is_no_work(&self) -> bool {
        matches!(self, MigError::NoWork { .. })
    }
}

/// Errors loading `mig.yml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// S001: Config file not found at an explicitly requested path
    #[error("[S001] Config file not found: {path}")]
    NotFound { path: String },

    /// S002: Failed to parse config file
    #[error("[S002] Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// S003: Invalid config value
    #[error("[S003] Invalid config: {message}")]
    Invalid { message: String },

    /// S004: IO error with path context
    #[error("[S004] IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for [`SettingsError`].
pub type SettingsResult<T> = Result<T, SettingsError>;
