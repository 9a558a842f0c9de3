//! Configuration loader.
//!
//! Merges configuration from three layers, later layers winning:
//! built-in defaults, the first `memento.toml` found, and `MEMENTO_*`
//! environment variables (`MEMENTO_STORAGE__BACKEND=sqlite` style nesting).

use super::{models::MementoConfig, validate, ConfigError, Result, DEFAULT_CONFIG_FILES};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::Path;

/// Loads [`MementoConfig`] from files and the environment.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default file locations and environment.
    pub fn load() -> Result<MementoConfig> {
        let mut figment = Figment::from(Serialized::defaults(MementoConfig::default()));

        for candidate in DEFAULT_CONFIG_FILES {
            if Path::new(candidate).exists() {
                figment = figment.merge(Toml::file(candidate));
                break;
            }
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file plus the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<MementoConfig> {
        let figment = Figment::from(Serialized::defaults(MementoConfig::default()))
            .merge(Toml::file(path.as_ref()));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<MementoConfig> {
        let config: MementoConfig = figment
            .merge(Env::prefixed(super::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use std::io::Write;

    #[test]
    fn load_from_merges_file_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("memento.toml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(
            file,
            "[storage]\nbackend = \"sqlite\"\ndefault_limit = 42\n"
        )
        .expect("write config");

        let config = ConfigLoader::load_from(&path).expect("load config");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.default_limit, 42);
        // Untouched fields keep their defaults
        assert_eq!(config.storage.max_content_length, 10_000);
    }
}
