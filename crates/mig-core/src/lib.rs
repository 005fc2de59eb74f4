//! mig-core - Migration engine for mig
//!
//! This crate provides the migration registry, the version table that
//! records which version a database is at, and the migrator that moves a
//! database up, down, or to a specific version, optionally inside a single
//! transaction.

pub mod error;
pub mod filename;
pub mod migrator;
pub mod outcome;
pub mod registry;
pub mod settings;
pub mod step;
pub mod version_store;

pub use error::{ConfigurationError, MigError, MigResult, SettingsError, SettingsResult};
pub use filename::{
    discover_migrations, discover_versions, is_valid_migration_name, migration_filename,
    version_from_file,
};
pub use migrator::Migrator;
pub use outcome::{MigrationFailure, MigrationOutcome, MigrationReport, MigrationStatus};
pub use registry::{Registry, SealedRegistry};
pub use settings::Settings;
pub use step::{Action, Direction, MigrationStep, StepBuilder};
pub use version_store::{VersionRecord, VersionStore, DEFAULT_TABLE_NAME};

pub use mig_db::{Connection, Database, DbError, DbResult};
