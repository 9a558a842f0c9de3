//! Configuration model types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the Memento memory system
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MementoConfig {
    /// Storage backend configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which persistence backend to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document per user with atomic writes and advisory locking
    #[default]
    File,
    /// A single relational table in SQLite
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Storage layer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,

    /// Directory holding user documents (file backend) or the database file
    /// (sqlite backend)
    pub data_dir: PathBuf,

    /// Bounded wait for the per-user write lock in the file backend
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,

    /// Default number of records a recall returns when unspecified
    pub default_limit: usize,

    /// Maximum accepted memory content length, in characters
    pub max_content_length: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("./data"),
            lock_timeout: Duration::from_secs(5),
            default_limit: crate::parser::DEFAULT_RECALL_LIMIT,
            max_content_length: 10_000,
        }
    }
}

/// Log verbosity levels
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level logging
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging (the default)
    #[default]
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging
    Error,
}

/// Log output formats
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output (the default)
    #[default]
    Pretty,
    /// Single-line compact output
    Compact,
    /// Structured JSON output
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Whether to log to stdout
    pub stdout: bool,

    /// Optional log file path
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            stdout: true,
            file: None,
        }
    }
}
