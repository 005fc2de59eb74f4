//! Scaffold command implementation - generates a migration manager binary

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path};

use crate::cli::{GlobalArgs, ScaffoldArgs};
use crate::commands::common::load_settings;
use crate::commands::create::{write_index, INDEX_FILE};

const CMDFILE_TEMPLATE: &str = r#"//! Migration manager for this project. Generated by `mig scaffold`.

#[path = "{module_path}"]
mod migrations;

fn main() -> std::process::ExitCode {
    let mut registry = mig_core::Registry::new();
    migrations::register(&mut registry);
    mig_cli::run(&registry.seal())
}
"#;

/// Execute the scaffold command
pub(crate) fn execute(args: &ScaffoldArgs, global: &GlobalArgs) -> Result<()> {
    let settings = load_settings(global)?;
    if settings.extension != "rs" {
        anyhow::bail!(
            "Scaffolding needs Rust migrations, but mig.yml sets extension '{}'",
            settings.extension
        );
    }

    let cmdfile = global.project_dir.join(&args.cmdfile);
    if cmdfile.exists() {
        anyhow::bail!("Provided cmdfile {} already exists", cmdfile.display());
    }

    let migrations_dir = settings.migrations_dir_absolute(&global.project_dir);
    if !migrations_dir.is_dir() {
        anyhow::bail!(
            "Unable to find a valid migrations directory at {}; create one with `mig new`",
            migrations_dir.display()
        );
    }
    if !migrations_dir.join(INDEX_FILE).exists() {
        log::warn!(
            "No {INDEX_FILE} in {}, generating one",
            migrations_dir.display()
        );
        write_index(&migrations_dir)?;
    }

    let module_path = module_path(&args.cmdfile, Path::new(&settings.migrations_dir))?;
    if let Some(parent) = cmdfile.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))?;
    }
    fs::write(&cmdfile, render_cmdfile(&module_path))
        .with_context(|| format!("Error creating cmd file {}", cmdfile.display()))?;

    println!("Successfully created command file at {}", cmdfile.display());
    Ok(())
}

pub(crate) fn render_cmdfile(module_path: &str) -> String {
    CMDFILE_TEMPLATE.replace("{module_path}", module_path)
}

/// Path of the migrations index as seen from the directory holding `cmdfile`.
///
/// Both paths are relative to the project root.
pub(crate) fn module_path(cmdfile: &Path, migrations_dir: &Path) -> Result<String> {
    let index = migrations_dir.join(INDEX_FILE);
    if migrations_dir.is_absolute() {
        return Ok(index.display().to_string());
    }

    let mut depth = 0;
    for component in cmdfile.parent().into_iter().flat_map(Path::components) {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            _ => anyhow::bail!(
                "cmdfile must be a relative path inside the project: {}",
                cmdfile.display()
            ),
        }
    }

    let mut path = "../".repeat(depth);
    for component in index.components() {
        match component {
            Component::Normal(part) => {
                path.push_str(&part.to_string_lossy());
                path.push('/');
            }
            Component::CurDir => {}
            _ => anyhow::bail!(
                "migrations_dir must stay inside the project: {}",
                migrations_dir.display()
            ),
        }
    }
    path.pop();
    Ok(path)
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
