//! Configuration types and parsing for mig.yml

use crate::error::{SettingsError, SettingsResult};
use crate::filename::{DEFAULT_EXTENSION, DEFAULT_VERSION_WIDTH};
use crate::version_store::DEFAULT_TABLE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest zero-padding that still fits every positive `i64` version.
const MAX_VERSION_WIDTH: usize = 18;

/// Project settings from mig.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Name of the version table
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Directory holding migration source files
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Extension of migration source files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Zero-padded width of the version prefix in new file names
    #[serde(default = "default_version_width")]
    pub version_width: usize,

    /// Database URL used when none is given on the command line
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_version_width() -> usize {
    DEFAULT_VERSION_WIDTH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            migrations_dir: default_migrations_dir(),
            extension: default_extension(),
            version_width: default_version_width(),
            database_url: None,
        }
    }
}

impl Settings {
    /// Load settings from a file path
    pub fn load(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            return Err(SettingsError::NotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a project directory.
    ///
    /// Looks for mig.yml or mig.yaml and falls back to the defaults when
    /// neither exists.
    pub fn load_from_dir(dir: &Path) -> SettingsResult<Self> {
        let yml_path = dir.join("mig.yml");
        let yaml_path = dir.join("mig.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            log::debug!("No mig.yml in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }

    /// Absolute migrations directory relative to `root`
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Validate the settings
    fn validate(&self) -> SettingsResult<()> {
        if !is_valid_table_name(&self.table_name) {
            return Err(SettingsError::Invalid {
                message: format!(
                    "table_name '{}' must be an identifier, optionally schema-qualified",
                    self.table_name
                ),
            });
        }

        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(SettingsError::Invalid {
                message: format!(
                    "extension '{}' must be non-empty and given without a leading dot",
                    self.extension
                ),
            });
        }

        if !(1..=MAX_VERSION_WIDTH).contains(&self.version_width) {
            return Err(SettingsError::Invalid {
                message: format!(
                    "version_width {} must be between 1 and {MAX_VERSION_WIDTH}",
                    self.version_width
                ),
            });
        }

        Ok(())
    }
}

/// Whether `name` is a plain or `schema.table` identifier.
///
/// The version table name is interpolated into SQL, so only
/// `[A-Za-z_][A-Za-z0-9_]*` parts are allowed.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut parts = name.split('.');
    let valid_ident = |part: &str| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    };

    match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => valid_ident(table),
        (Some(schema), Some(table), None) => valid_ident(schema) && valid_ident(table),
        _ => false,
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
