//! Status command implementation

use anyhow::{Context, Result};
use chrono::DateTime;
use mig_core::{MigrationStatus, SealedRegistry};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::Session;

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs, registry: &SealedRegistry) -> Result<()> {
    let session = Session::open(&args.database, global)?;
    let status = session
        .migrator(registry)
        .status(&session.db)
        .context("Failed to read migration status")?;

    if !status.current_registered {
        log::warn!(
            "Current version {} is not a registered migration",
            status.current_version
        );
    }

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        StatusOutput::Table => print!("{}", render_table(&status)),
    }
    Ok(())
}

/// Human-readable status summary.
pub(crate) fn render_table(status: &MigrationStatus) -> String {
    let mut out = String::new();
    out.push_str(&format!("Current version: {}\n", status.current_version));
    out.push_str(&format!("Latest version:  {}\n", status.latest_version));

    if status.pending.is_empty() {
        out.push_str("Pending:         none\n");
    } else {
        let pending: Vec<String> = status.pending.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!("Pending:         {}\n", pending.join(", ")));
    }

    if !status.history.is_empty() {
        out.push_str("\nHistory (newest first):\n");
        for record in &status.history {
            let applied = DateTime::from_timestamp_micros(record.applied_at)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string())
                .unwrap_or_else(|| record.applied_at.to_string());
            out.push_str(&format!("  {:>8}  {applied}\n", record.version));
        }
    }
    out
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
