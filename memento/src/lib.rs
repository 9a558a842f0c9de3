//! # Memento
//!
//! Per-user memory storage for AI assistants, with natural-language command
//! interpretation, automatic categorization, and multi-dimensional retrieval
//! (text, category, tag, and time-window filters).
//!
//! Memento keeps every user's memories strictly isolated. Two interchangeable
//! storage backends are provided: a SQLite table and a one-JSON-document-per-user
//! file store with atomic writes and advisory locking. Both expose the same
//! externally observable behavior through the [`storage::MemoryStore`] trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memento::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let service = memento::init_with_defaults().await?;
//!
//!     // Natural-language storage ("Hey Memento" style commands)
//!     let record = service
//!         .store_text("alice@laptop", "Hey Memento, remember that the demo is on Friday #work")
//!         .await?;
//!     println!("stored memory #{} in {}", record.id, record.category);
//!
//!     // Natural-language recall with time filtering
//!     let memories = service
//!         .recall_text("alice@laptop", "What did I tell you about the demo this week?")
//!         .await?;
//!     println!("found {} memories", memories.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Parser**: deterministic trigger-phrase and keyword tables turn free text
//!   into a [`parser::ParsedCommand`] (store / recall / ambiguous).
//! - **Storage**: [`storage::SqliteStore`] and [`storage::FileStore`] behind a
//!   common async trait; every operation is scoped to a single `user_id`.
//! - **Service**: [`service::MemoryService`] orchestrates parsing, validation,
//!   and persistence.
//! - **Tools**: [`tools::ToolAdapter`] is the narrow call/return boundary used
//!   by surrounding transports (MCP servers, CLIs, function-calling glue).

pub mod config;
pub mod identity;
pub mod logging;
pub mod models;
pub mod parser;
pub mod service;
pub mod storage;
pub mod tools;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    // Re-export core initialization functions
    pub use crate::{init, init_with_defaults};

    // Re-export config types
    pub use crate::config::{
        ConfigBuilder, LogFormat, LogLevel, LoggingConfig, MementoConfig, StorageBackend,
        StorageConfig,
    };

    // Re-export model types
    pub use crate::models::{Category, DraftBuilder, MemoryDraft, MemoryRecord, MemoryStats};

    // Re-export parser types
    pub use crate::parser::ParsedCommand;

    // Re-export the service and its request types
    pub use crate::service::{MemoryService, RecallRequest};

    // Re-export storage types for advanced usage
    pub use crate::storage::{MemoryStore, SearchRequest, StorageError};

    // Re-export the tool-call boundary
    pub use crate::tools::{ToolAdapter, ToolCall};

    // Re-export essential result type
    pub use crate::{MementoError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Memento operations with helpful recovery suggestions
#[derive(Debug, thiserror::Error)]
pub enum MementoError {
    /// Invalid caller-supplied input (empty user id, empty content, bad filter)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Storage directory not accessible
    #[error(
        "Storage directory not accessible: {path}. Ensure the directory exists and has write permissions"
    )]
    StorageNotAccessible { path: String },

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::storage::StorageError> for MementoError {
    fn from(err: crate::storage::StorageError) -> Self {
        match err {
            crate::storage::StorageError::Validation(msg) => MementoError::Validation(msg),
            other => MementoError::Storage(other.to_string()),
        }
    }
}

impl From<crate::config::ConfigError> for MementoError {
    fn from(err: crate::config::ConfigError) -> Self {
        MementoError::Configuration(err.to_string())
    }
}

/// Result type for Memento operations
pub type Result<T> = std::result::Result<T, MementoError>;

/// Initialize Memento with default configuration
///
/// Sets up the memory system with sensible defaults (file-based storage under
/// the per-platform data directory) and returns a [`service::MemoryService`].
///
/// # Examples
///
/// ```rust,no_run
/// use memento::prelude::*;
///
/// async fn example() -> Result<()> {
///     let service = memento::init_with_defaults().await?;
///     service.store_text("alice", "remember that the sky is blue").await?;
///     Ok(())
/// }
/// ```
pub async fn init_with_defaults() -> Result<service::MemoryService> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config).await
}

/// Initialize Memento with the provided configuration
///
/// Initializes logging, opens the configured storage backend, and returns a
/// [`service::MemoryService`] wired to it.
///
/// # Arguments
/// * `config` - The configuration for initializing Memento
pub async fn init(config: config::MementoConfig) -> Result<service::MemoryService> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    let store = storage::create_store(&config)
        .await
        .map_err(|e| MementoError::Storage(e.to_string()))?;
    let store = std::sync::Arc::from(store);

    Ok(service::MemoryService::new(store, config))
}
