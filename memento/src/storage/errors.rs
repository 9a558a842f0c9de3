//! Error types for storage operations

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Invalid caller-supplied input (empty user id, empty content, bad filter)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying medium unreadable or unwritable
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database-level failure (relational backend)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored document could not be interpreted
    #[error("Corrupted store for user key '{key}': {reason}")]
    Corrupted {
        /// Sanitized user key of the offending document
        key: String,
        /// What went wrong while reading it
        reason: String,
    },

    /// Could not acquire the per-user write lock within the bounded wait
    #[error("Timed out after {waited_ms}ms waiting for the write lock on user key '{key}'")]
    LockTimeout {
        /// Sanitized user key whose lock could not be acquired
        key: String,
        /// How long the writer waited before giving up
        waited_ms: u64,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Convenience constructor for validation failures
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}
