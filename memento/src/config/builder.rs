//! Configuration builder.
//!
//! Fluent API for constructing configurations programmatically.

use super::{models::*, validate, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for creating [`MementoConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: MementoConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: MementoConfig::default(),
        }
    }

    /// Create a builder preloaded with the recommended defaults: file-based
    /// storage under the per-platform data directory.
    pub fn defaults() -> Self {
        Self::new().with_default_storage()
    }

    /// Set the base data directory.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Select the file-based backend.
    pub fn with_file_storage(mut self) -> Self {
        self.config.storage.backend = StorageBackend::File;
        self
    }

    /// Select the SQLite backend.
    pub fn with_sqlite_storage(mut self) -> Self {
        self.config.storage.backend = StorageBackend::Sqlite;
        self
    }

    /// Select a backend by value (useful when the choice comes from a flag).
    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage.backend = backend;
        self
    }

    /// Use default storage configuration: file-based storage under
    /// `~/.memento/data` (falling back to `./data` without a home directory).
    pub fn with_default_storage(mut self) -> Self {
        if self.config.storage.data_dir == PathBuf::from("./data") {
            let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            self.config.storage.data_dir = home_dir.join(".memento").join("data");
        }
        self.config.storage.backend = StorageBackend::File;
        self
    }

    /// Set the bounded wait for the per-user write lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.storage.lock_timeout = timeout;
        self
    }

    /// Set the default recall limit.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.storage.default_limit = limit;
        self
    }

    /// Set the maximum accepted content length.
    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.config.storage.max_content_length = max;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Use default logging configuration (pretty output to stdout at info).
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging = LoggingConfig::default();
        self
    }

    /// Disable log output entirely.
    pub fn with_quiet_logging(mut self) -> Self {
        self.config.logging.stdout = false;
        self.config.logging.file = None;
        self
    }

    /// Validate and build the final configuration.
    pub fn build(self) -> Result<MementoConfig> {
        validate(&self.config)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_settings() {
        let config = ConfigBuilder::new()
            .with_data_dir("/tmp/memento-test")
            .with_sqlite_storage()
            .with_default_limit(25)
            .build()
            .expect("valid config");

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/memento-test"));
        assert_eq!(config.storage.default_limit, 25);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = ConfigBuilder::new().with_default_limit(0).build();
        assert!(err.is_err());
    }

    #[test]
    fn defaults_select_file_backend() {
        let config = ConfigBuilder::defaults().build().expect("valid config");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.storage.data_dir.ends_with("data"));
    }
}
