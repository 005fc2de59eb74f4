//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Migration manager for a project's registered migrations
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(version, about = "Manages database migrations", long_about = None)]
pub struct ManagerCli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: ManagerCommands,
}

/// mig - project tooling for migrations
#[derive(Parser, Debug)]
#[command(name = "mig")]
#[command(version, about = "Creates migrations and scaffolds migration managers", long_about = None)]
pub struct MigCli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: MigCommands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Manager subcommands
#[derive(Subcommand, Debug)]
pub enum ManagerCommands {
    /// Execute all the pending migrations
    Up(MigrateArgs),

    /// Roll back just one migration
    #[command(alias = "rollback")]
    Down(MigrateArgs),

    /// Migrate up or down until the database is at the given version
    ToVersion(ToVersionArgs),

    /// Show the current version and pending migrations
    Status(StatusArgs),

    /// Create a new migration file
    Create(CreateArgs),
}

/// Tooling subcommands
#[derive(Subcommand, Debug)]
pub enum MigCommands {
    /// Create a new migration file
    New(CreateArgs),

    /// Generate a manager binary for the project's migrations
    Scaffold(ScaffoldArgs),
}

/// Database selection
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// URL of the database, e.g. `duckdb://path/to/app.duckdb`
    #[arg(short, long, env = "MIG_DATABASE_URL")]
    pub url: Option<String>,
}

/// Arguments for up and down
#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Run each migration on its own instead of in a single transaction
    #[arg(long)]
    pub no_tx: bool,
}

/// Arguments for the to-version command
#[derive(Args, Debug, Clone)]
pub struct ToVersionArgs {
    /// Target version
    pub version: i64,

    #[command(flatten)]
    pub migrate: MigrateArgs,
}

/// Arguments for the status command
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable summary
    Table,
    /// JSON document
    Json,
}

/// Arguments for create / new
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Name of the migration, e.g. `add_users_table`
    pub name: String,

    /// Migrations folder (default: `migrations_dir` from mig.yml)
    #[arg(short, long)]
    pub folder: Option<PathBuf>,
}

/// Arguments for the scaffold command
#[derive(Args, Debug, Clone)]
pub struct ScaffoldArgs {
    /// Path where the manager source file is written, relative to the project
    #[arg(short = 'f', long, default_value = "src/bin/migrate.rs")]
    pub cmdfile: PathBuf,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
