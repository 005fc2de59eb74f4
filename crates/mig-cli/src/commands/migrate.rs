//! Migration commands: up, down, and to-version

use anyhow::Result;
use mig_core::SealedRegistry;

use crate::cli::{GlobalArgs, MigrateArgs, ToVersionArgs};
use crate::commands::common::{report, Session};

/// Execute all the pending migrations.
pub(crate) fn up(args: &MigrateArgs, global: &GlobalArgs, registry: &SealedRegistry) -> Result<()> {
    let session = Session::open(&args.database, global)?;
    report(session.migrator(registry).up(&session.db, !args.no_tx))
}

/// Roll back the migration at the current version.
pub(crate) fn down(
    args: &MigrateArgs,
    global: &GlobalArgs,
    registry: &SealedRegistry,
) -> Result<()> {
    let session = Session::open(&args.database, global)?;
    report(session.migrator(registry).down(&session.db, !args.no_tx))
}

/// Move the database to the requested version.
pub(crate) fn to_version(
    args: &ToVersionArgs,
    global: &GlobalArgs,
    registry: &SealedRegistry,
) -> Result<()> {
    let session = Session::open(&args.migrate.database, global)?;
    report(session.migrator(registry).to_version(
        &session.db,
        !args.migrate.no_tx,
        args.version,
    ))
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
