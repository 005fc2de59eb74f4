//! Registry of migration steps.
//!
//! A [`Registry`] is built once during start-up, then [sealed](Registry::seal)
//! into a [`SealedRegistry`] that the [`Migrator`](crate::Migrator) borrows.
//! Sealing consumes the builder, so no step can be added once execution is
//! possible.
//!
//! Registration invariants (positive, unique versions; well-formed labels
//! whose number matches the declared version; both actions present) are
//! checked eagerly. A violation is a programming mistake: the panicking
//! methods abort start-up with the [`ConfigurationError`], while the `try_`
//! variants hand it back for hosts that want to report it first.

use crate::error::ConfigurationError;
use crate::filename::{version_from_file, DEFAULT_EXTENSION};
use crate::step::{MigrationStep, StepBuilder};
use mig_db::{Database, DbResult};

/// Mutable, append-only collection of migration steps.
#[derive(Debug)]
pub struct Registry {
    steps: Vec<MigrationStep>,
    extension: String,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry expecting `.rs` labels.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Create an empty registry whose labels must carry `extension`.
    ///
    /// Panics if the extension is empty or starts with a dot.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        if extension.is_empty() || extension.starts_with('.') {
            panic!("{}", ConfigurationError::InvalidExtension { extension });
        }
        Self {
            steps: Vec::new(),
            extension,
        }
    }

    /// Register a step from its version, label, and actions.
    ///
    /// Panics on any registration invariant violation.
    pub fn register<U, D>(
        &mut self,
        version: i64,
        label: impl Into<String>,
        up: U,
        down: D,
    ) -> &mut Self
    where
        U: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
        D: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
    {
        self.add(MigrationStep::builder(version, label).up(up).down(down))
    }

    /// Fallible twin of [`register`](Self::register).
    pub fn try_register<U, D>(
        &mut self,
        version: i64,
        label: impl Into<String>,
        up: U,
        down: D,
    ) -> Result<(), ConfigurationError>
    where
        U: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
        D: Fn(&dyn Database) -> DbResult<()> + Send + Sync + 'static,
    {
        self.try_add(MigrationStep::builder(version, label).up(up).down(down))
    }

    /// Register a step whose actions run fixed SQL batches.
    ///
    /// Suits migrations embedded with `include_str!`.
    pub fn register_sql(
        &mut self,
        version: i64,
        label: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
    ) -> &mut Self {
        let up_sql = up_sql.into();
        let down_sql = down_sql.into();
        self.register(
            version,
            label,
            move |db: &dyn Database| db.execute_batch(&up_sql),
            move |db: &dyn Database| db.execute_batch(&down_sql),
        )
    }

    /// Register a step from a builder, panicking on violation.
    pub fn add(&mut self, builder: StepBuilder) -> &mut Self {
        if let Err(e) = self.try_add(builder) {
            panic!("{e}");
        }
        self
    }

    /// Validate and append a step.
    pub fn try_add(&mut self, builder: StepBuilder) -> Result<(), ConfigurationError> {
        let step = builder.build()?;
        self.validate(&step)?;
        log::debug!(
            "Registered migration v{} from '{}'",
            step.version(),
            step.label()
        );
        self.steps.push(step);
        Ok(())
    }

    fn validate(&self, step: &MigrationStep) -> Result<(), ConfigurationError> {
        let version = step.version();
        let label = step.label();

        if version <= 0 {
            return Err(ConfigurationError::NonPositiveVersion {
                version,
                label: label.to_string(),
            });
        }

        let parsed = version_from_file(label, &self.extension)?;
        if parsed != version {
            return Err(ConfigurationError::VersionMismatch {
                label: label.to_string(),
                declared: version,
                parsed,
            });
        }

        if let Some(existing) = self.steps.iter().find(|s| s.version() == version) {
            return Err(ConfigurationError::DuplicateVersion {
                version,
                existing: existing.label().to_string(),
            });
        }

        Ok(())
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Registered steps sorted ascending by version (stable).
    pub fn sorted_view(&self) -> Vec<&MigrationStep> {
        let mut view: Vec<&MigrationStep> = self.steps.iter().collect();
        view.sort_by_key(|s| s.version());
        view
    }

    /// Freeze the registry for execution.
    pub fn seal(mut self) -> SealedRegistry {
        self.steps.sort_by_key(|s| s.version());
        log::debug!("Sealed migration registry with {} steps", self.steps.len());
        SealedRegistry { steps: self.steps }
    }
}

/// Frozen registry, sorted ascending by version.
#[derive(Debug)]
pub struct SealedRegistry {
    steps: Vec<MigrationStep>,
}

impl SealedRegistry {
    /// Steps in ascending version order.
    pub fn sorted_view(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Whether `version` is registered.
    pub fn contains(&self, version: i64) -> bool {
        self.get(version).is_some()
    }

    /// Look up the step for `version`.
    pub fn get(&self, version: i64) -> Option<&MigrationStep> {
        self.steps
            .binary_search_by_key(&version, |s| s.version())
            .ok()
            .map(|idx| &self.steps[idx])
    }

    /// All registered versions, ascending.
    pub fn versions(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.version()).collect()
    }

    /// Highest registered version, or 0 when empty.
    pub fn latest_version(&self) -> i64 {
        self.steps.last().map_or(0, |s| s.version())
    }

    /// Highest registered version strictly below `version`, or 0.
    ///
    /// This is where the database stands after undoing `version`.
    pub fn previous_version(&self, version: i64) -> i64 {
        self.steps
            .iter()
            .rev()
            .map(|s| s.version())
            .find(|v| *v < version)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
