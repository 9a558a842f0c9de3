//! Structured logging infrastructure for Memento.
//!
//! Thin wrapper over the tracing ecosystem: configurable level, output format
//! (pretty, compact, JSON), and an optional log file. Initialization is
//! idempotent so embedding applications that already installed a subscriber
//! are left alone.

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error in subscriber setup
    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// Returns `Ok(())` when a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = match config.level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    };

    if !config.stdout && config.file.is_none() {
        // Logging disabled; leave the no-op default subscriber in place.
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let result = match (&config.file, config.format) {
        (Some(path), format) => init_file(path, filter, format),
        (None, LogFormat::Json) => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        (None, LogFormat::Compact) => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        (None, LogFormat::Pretty) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    match result {
        Ok(()) => Ok(()),
        // An already-installed subscriber is fine; anything else is not.
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(LogError::Subscriber(e.to_string())),
    }
}

fn init_file(
    path: &Path,
    filter: EnvFilter,
    format: LogFormat,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "memento.log".to_string());
    let writer = tracing_appender::rolling::never(dir, file_name);

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init(),
    }
}
