//! Create command implementation - writes a new migration file

use anyhow::{Context, Result};
use mig_core::{discover_migrations, is_valid_migration_name, migration_filename, Settings};
use std::fs;
use std::path::Path;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::load_settings;

/// Name of the generated module that registers every migration in a
/// directory.
pub(crate) const INDEX_FILE: &str = "mod.rs";

const MIGRATION_TEMPLATE: &str = r#"use mig_core::{Database, Registry};

pub fn register(registry: &mut Registry) {
    registry.register(
        {version},
        file!(),
        |db: &dyn Database| db.execute_batch("UP"),
        |db: &dyn Database| db.execute_batch("DOWN"),
    );
}
"#;

/// Execute the create command
pub(crate) fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let settings = load_settings(global)?;
    let dir = match &args.folder {
        Some(folder) => global.project_dir.join(folder),
        None => settings.migrations_dir_absolute(&global.project_dir),
    };

    let file = create_migration(&dir, &args.name, &settings)?;
    println!("Created migration file: {}", dir.join(file).display());
    Ok(())
}

/// Write a new migration named `name` into `dir` and return its file name.
///
/// The version is one past the highest version already in `dir`. For Rust
/// migrations the directory's `mod.rs` is regenerated so it registers the
/// new file too.
pub fn create_migration(dir: &Path, name: &str, settings: &Settings) -> Result<String> {
    if !is_valid_migration_name(name) {
        anyhow::bail!(
            "Invalid migration name '{name}': only letters, digits, '_' and '-' are allowed"
        );
    }

    if dir.exists() {
        if !dir.is_dir() {
            anyhow::bail!(
                "Migrations directory path {} already exists but it's not a directory",
                dir.display()
            );
        }
    } else {
        fs::create_dir_all(dir).with_context(|| {
            format!("Unable to create migrations directory at {}", dir.display())
        })?;
    }

    let existing = discover_migrations(dir, &settings.extension).with_context(|| {
        format!("Unable to list migrations directory files in {}", dir.display())
    })?;
    let latest = existing.last().map_or(0, |(v, _)| *v);
    let Some(version) = latest.checked_add(1) else {
        anyhow::bail!(
            "Migration version {latest} in {} is the largest possible; no version can follow it",
            dir.display()
        );
    };

    let file_name = migration_filename(version, name, &settings.extension, settings.version_width);
    let path = dir.join(&file_name);
    if path.exists() {
        anyhow::bail!("Migration file {} already exists", path.display());
    }

    let content = if settings.extension == "rs" {
        MIGRATION_TEMPLATE.replace("{version}", &version.to_string())
    } else {
        String::new()
    };
    fs::write(&path, content).context("Unable to create migration file")?;
    log::debug!("Wrote migration {version} to {}", path.display());

    if settings.extension == "rs" {
        write_index(dir)?;
    }
    Ok(file_name)
}

/// Regenerate `mod.rs` so it declares and registers every migration in `dir`.
pub(crate) fn write_index(dir: &Path) -> Result<()> {
    let migrations = discover_migrations(dir, "rs")
        .with_context(|| format!("Unable to list migrations in {}", dir.display()))?;

    let mut decls = String::new();
    let mut calls = String::new();
    for (_, file_name) in &migrations {
        let module = module_name(file_name);
        decls.push_str(&format!("#[path = \"{file_name}\"]\nmod {module};\n"));
        calls.push_str(&format!("    {module}::register(registry);\n"));
    }

    let content = format!(
        "//! Generated by `mig new`. Changes are overwritten.\n\
         \n\
         use mig_core::Registry;\n\
         \n\
         {decls}\n\
         /// Register every migration in this directory.\n\
         pub fn register(registry: &mut Registry) {{\n\
         {calls}}}\n"
    );

    let path = dir.join(INDEX_FILE);
    fs::write(&path, content).with_context(|| format!("Unable to write {}", path.display()))
}

/// Module identifier for a migration file: `0001_add-users.rs` becomes
/// `m0001_add_users`.
fn module_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    format!("m{}", stem.replace('-', "_"))
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
