//! Configuration system for Memento.
//!
//! Configuration can be built programmatically with [`ConfigBuilder`] or
//! loaded from files and environment variables with [`ConfigLoader`], with
//! defaults applied and validated in both paths.

mod builder;
mod loader;
mod models;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "memento.toml",
    ".memento/config.toml",
];

/// Environment variable prefix for Memento configuration
pub const ENV_PREFIX: &str = "MEMENTO_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file or environment loading
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Validate a configuration before it is used.
pub(crate) fn validate(config: &MementoConfig) -> Result<()> {
    if config.storage.default_limit == 0 {
        return Err(ConfigError::ValidationError(
            "storage.default_limit must be greater than zero".to_string(),
        ));
    }
    if config.storage.max_content_length == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_content_length must be greater than zero".to_string(),
        ));
    }
    if config.storage.lock_timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "storage.lock_timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
