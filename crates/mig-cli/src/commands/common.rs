//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use mig_core::{MigrationFailure, MigrationOutcome, Migrator, SealedRegistry, Settings, VersionStore};
use mig_db::{Database, DuckDbBackend};
use std::fmt;

use crate::cli::{DatabaseArgs, GlobalArgs};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load settings from `--config`, or from the project directory.
pub(crate) fn load_settings(global: &GlobalArgs) -> Result<Settings> {
    match &global.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Settings::load_from_dir(&global.project_dir).context("Failed to load mig.yml"),
    }
}

/// Pick the database URL: `--url` (or `MIG_DATABASE_URL`), then mig.yml.
pub(crate) fn resolve_database_url(args: &DatabaseArgs, settings: &Settings) -> Result<String> {
    args.url
        .clone()
        .or_else(|| settings.database_url.clone())
        .context("No database URL: pass --url, set MIG_DATABASE_URL, or set database_url in mig.yml")
}

/// Open the database a URL points at.
pub(crate) fn open_connection(url: &str) -> Result<DuckDbBackend> {
    DuckDbBackend::from_url(url)
        .with_context(|| format!("Unable to open a database connection to '{url}'"))
}

/// An open connection plus the version store configured for it.
pub(crate) struct Session {
    pub(crate) db: DuckDbBackend,
    pub(crate) store: VersionStore,
}

impl Session {
    pub(crate) fn open(database: &DatabaseArgs, global: &GlobalArgs) -> Result<Self> {
        let settings = load_settings(global)?;
        let url = resolve_database_url(database, &settings)?;
        let db = open_connection(&url)?;
        let store = VersionStore::try_new(settings.table_name.as_str())
            .with_context(|| format!("Invalid version table name '{}'", settings.table_name))?;
        log::debug!(
            "Connected to {} database at {url} (version table {})",
            db.db_type(),
            store.table_name()
        );
        Ok(Self { db, store })
    }

    pub(crate) fn migrator<'r>(&self, registry: &'r SealedRegistry) -> Migrator<'r> {
        Migrator::new(registry).with_store(self.store.clone())
    }
}

/// Report the outcome of a migration command.
///
/// Being already at the requested version, or having nothing to run, is a
/// warning. Any other failure is printed with its cause chain and turned
/// into exit code 1.
pub(crate) fn report(outcome: MigrationOutcome) -> Result<()> {
    match outcome {
        Ok(report) if report.old_version == report.new_version => {
            log::warn!(
                "No migrations executed, database is at the same version: {}",
                report.old_version
            );
            Ok(())
        }
        Ok(report) => {
            println!(
                "Database migrated: {} -> {}",
                report.old_version, report.new_version
            );
            Ok(())
        }
        Err(failure) if failure.error.is_no_work() => {
            log::warn!("{}", failure.error);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", describe_failure(&failure));
            Err(ExitCode(1).into())
        }
    }
}

/// Multi-line description of a failure: summary, causes, partial state.
pub(crate) fn describe_failure(failure: &MigrationFailure) -> String {
    let mut out = format!("Error: {failure}");

    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&failure.error);
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }

    if failure.has_unrecorded_effects() {
        let reached = failure
            .reached_version
            .map_or_else(|| "unknown".to_string(), |v| v.to_string());
        let recorded = failure
            .old_version
            .map_or_else(|| "none".to_string(), |v| v.to_string());
        out.push_str(&format!(
            "\n  migrations {:?} were applied without a version record: the schema \
             reflects version {reached}, the version table still records version {recorded}",
            failure.applied
        ));
    }
    out
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
