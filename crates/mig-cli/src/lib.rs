//! mig-cli - command-line entry points for mig
//!
//! A project's migration manager is a small binary that builds the
//! project's [`Registry`](mig_core::Registry), seals it, and hands it to
//! [`run`]:
//!
//! ```no_run
//! fn main() -> std::process::ExitCode {
//!     let mut registry = mig_core::Registry::new();
//!     registry.register_sql(
//!         1,
//!         "0001_create_users.rs",
//!         "CREATE TABLE users (id INTEGER)",
//!         "DROP TABLE users",
//!     );
//!     mig_cli::run(&registry.seal())
//! }
//! ```
//!
//! The standalone `mig` binary ([`run_tool`]) creates migration files and
//! scaffolds such a manager.

use anyhow::Result;
use clap::Parser;
use mig_core::SealedRegistry;
use std::ffi::OsString;
use std::process;

pub mod cli;
pub mod commands;

use cli::{ManagerCli, ManagerCommands, MigCli, MigCommands};
use commands::common::ExitCode;
use commands::{create, migrate, scaffold, status};

pub use commands::create::create_migration;

/// Run the migration manager with the process arguments.
pub fn run(registry: &SealedRegistry) -> process::ExitCode {
    finish(run_from(registry, std::env::args_os()))
}

/// Run the migration manager with explicit arguments (the first is the
/// program name).
pub fn run_from<I, T>(registry: &SealedRegistry, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match ManagerCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => return clap_exit(e),
    };
    init_logging(cli.global.verbose);

    match &cli.command {
        ManagerCommands::Up(args) => migrate::up(args, &cli.global, registry),
        ManagerCommands::Down(args) => migrate::down(args, &cli.global, registry),
        ManagerCommands::ToVersion(args) => migrate::to_version(args, &cli.global, registry),
        ManagerCommands::Status(args) => status::execute(args, &cli.global, registry),
        ManagerCommands::Create(args) => create::execute(args, &cli.global),
    }
}

/// Run the `mig` tool with the process arguments.
pub fn run_tool() -> process::ExitCode {
    finish(run_tool_from(std::env::args_os()))
}

/// Run the `mig` tool with explicit arguments.
pub fn run_tool_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match MigCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => return clap_exit(e),
    };
    init_logging(cli.global.verbose);

    match &cli.command {
        MigCommands::New(args) => create::execute(args, &cli.global),
        MigCommands::Scaffold(args) => scaffold::execute(args, &cli.global),
    }
}

/// Print clap's help, version, or usage error and map it to an exit code.
fn clap_exit(err: clap::Error) -> Result<()> {
    err.print()?;
    match err.exit_code() {
        0 => Ok(()),
        code => Err(ExitCode(code).into()),
    }
}

/// Install `env_logger`: `info` by default, `debug` with `--verbose`.
/// `RUST_LOG` takes precedence over both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // A host that already installed a logger keeps it.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Turn a command result into a process exit code, printing errors that
/// were not reported yet.
fn finish(result: Result<()>) -> process::ExitCode {
    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => process::ExitCode::from(u8::try_from(code.0).unwrap_or(1)),
            None => {
                eprintln!("Error: {err:#}");
                process::ExitCode::FAILURE
            }
        },
    }
}
