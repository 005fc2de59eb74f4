//! Migration file naming: `NUMBER_NAME.EXT`.
//!
//! The number is the migration version (leading zeros allowed), the name is
//! free-form, and the extension must match the one the registry expects.
//! New files are numbered one past the highest version already on disk and
//! zero-padded to a fixed width.

use crate::error::ConfigurationError;
use std::path::Path;

/// Default extension for migration source files.
pub const DEFAULT_EXTENSION: &str = "rs";

/// Default zero-padded width of the version prefix.
pub const DEFAULT_VERSION_WIDTH: usize = 4;

/// Separator between version and name.
const SEPARATOR: char = '_';

/// Parse the version out of a migration file name.
///
/// `file` may carry directories (e.g. the output of `file!()`); only the final
/// component is inspected.
pub fn version_from_file(file: &str, extension: &str) -> Result<i64, ConfigurationError> {
    let malformed = |reason: String| ConfigurationError::MalformedLabel {
        label: file.to_string(),
        reason,
    };

    let base = Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| malformed("no file name".to_string()))?;

    let stem = base
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .ok_or_else(|| malformed(format!("migration file should have .{extension} extension")))?;

    let Some((number, name)) = stem.split_once(SEPARATOR) else {
        return Err(malformed(format!(
            "migration file name must be NUMBER_NAME.{extension}"
        )));
    };

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!(
            "migration file name must be NUMBER_NAME.{extension}"
        )));
    }
    if name.is_empty() {
        return Err(malformed("migration name after the version is empty".to_string()));
    }

    number
        .parse::<i64>()
        .map_err(|e| malformed(format!("version '{number}' is out of range: {e}")))
}

/// Build the file name for a new migration.
pub fn migration_filename(version: i64, name: &str, extension: &str, width: usize) -> String {
    format!("{version:0width$}{SEPARATOR}{name}.{extension}")
}

/// Whether `name` is acceptable as the name part of a new migration file.
pub fn is_valid_migration_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Collect the migration files in `dir` as `(version, file name)`, ordered
/// by version.
///
/// Files whose names do not parse are ignored.
pub fn discover_migrations(dir: &Path, extension: &str) -> std::io::Result<Vec<(i64, String)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        if let Ok(version) = version_from_file(&file_name, extension) {
            found.push((version, file_name));
        }
    }
    found.sort();
    Ok(found)
}

/// Versions of all migration files in `dir`, ascending.
pub fn discover_versions(dir: &Path, extension: &str) -> std::io::Result<Vec<i64>> {
    Ok(discover_migrations(dir, extension)?
        .into_iter()
        .map(|(version, _)| version)
        .collect())
}

#[cfg(test)]
#[path = "filename_test.rs"]
mod tests;
