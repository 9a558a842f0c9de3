//! Storage abstractions and implementations
//!
//! This module defines the [`MemoryStore`] trait shared by both persistence
//! backends and the backends themselves:
//!
//! - **SqliteStore**: a single relational table keyed by `(user_id, id)` with
//!   per-user id allocation inside the insert transaction.
//! - **FileStore**: one JSON document per sanitized user key, written with an
//!   atomic temp-file-and-rename cycle under an advisory file lock.
//!
//! Both backends enforce the same contract: every operation is scoped to a
//! single `user_id`, results are ordered newest first, and all supplied
//! filters are conjunctive.

pub mod errors;
pub mod file;
pub mod sqlite;

pub use errors::{StorageError, StorageResult};
pub use file::FileStore;
pub use sqlite::SqliteStore;

use crate::config::{MementoConfig, StorageBackend};
use crate::models::{MemoryDraft, MemoryRecord, MemoryStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Conjunctive search filters for a single user's memories
///
/// Every populated field must match for a record to be returned. An empty
/// request returns the most recent records up to `limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Substring match over content and tags (case-insensitive)
    pub text: Option<String>,

    /// Exact category match
    pub category: Option<String>,

    /// Record must carry this tag
    pub tag: Option<String>,

    /// Record must have been created at or after this instant
    pub since: Option<DateTime<Utc>>,

    /// Maximum number of records to return
    pub limit: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            text: None,
            category: None,
            tag: None,
            since: None,
            limit: crate::parser::DEFAULT_RECALL_LIMIT,
        }
    }
}

/// Common contract for memory persistence backends
#[async_trait]
pub trait MemoryStore: Send + Sync + Debug {
    /// Persist a new memory for `user_id`, assigning the next per-user id and
    /// both timestamps. Returns the full stored record.
    async fn create(&self, user_id: &str, draft: MemoryDraft) -> StorageResult<MemoryRecord>;

    /// Search `user_id`'s memories. All supplied filters are conjunctive;
    /// results are sorted by `created_at` descending and truncated to
    /// `request.limit`.
    async fn search(
        &self,
        user_id: &str,
        request: &SearchRequest,
    ) -> StorageResult<Vec<MemoryRecord>>;

    /// Aggregate statistics over `user_id`'s memories.
    async fn stats(&self, user_id: &str) -> StorageResult<MemoryStats>;

    /// All user identifiers that own at least one record, sorted and
    /// deduplicated. Administrative.
    async fn list_users(&self) -> StorageResult<Vec<String>>;

    /// Check that the store is reachable and writable.
    async fn health_check(&self) -> StorageResult<bool>;

    /// Release resources held by the store.
    async fn close(&self) -> StorageResult<()>;
}

/// Create the storage backend selected by the configuration.
pub async fn create_store(config: &MementoConfig) -> StorageResult<Box<dyn MemoryStore>> {
    match config.storage.backend {
        StorageBackend::File => {
            let store =
                FileStore::new(config.storage.data_dir.clone(), config.storage.lock_timeout)?;
            Ok(Box::new(store))
        }
        StorageBackend::Sqlite => {
            let path = config.storage.data_dir.join("memento.db");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteStore::open(&path)?;
            Ok(Box::new(store))
        }
    }
}

/// Shared validation for every read and write: the user id must be non-empty.
pub(crate) fn validate_user_id(user_id: &str) -> StorageResult<()> {
    if user_id.trim().is_empty() {
        return Err(StorageError::validation("user_id must not be empty"));
    }
    Ok(())
}

/// Shared validation for writes: the content must survive trimming.
pub(crate) fn validate_draft(draft: &MemoryDraft) -> StorageResult<()> {
    if draft.is_empty() {
        return Err(StorageError::validation(
            "memory content must not be empty",
        ));
    }
    Ok(())
}

/// Shared validation for searches: a zero limit is a caller mistake, not an
/// empty result.
pub(crate) fn validate_request(request: &SearchRequest) -> StorageResult<()> {
    if request.limit == 0 {
        return Err(StorageError::validation("limit must be greater than zero"));
    }
    Ok(())
}

/// Whether a record matches every populated filter. Used by the file backend
/// and by tests as the reference filter semantics.
pub(crate) fn matches(record: &MemoryRecord, request: &SearchRequest) -> bool {
    if let Some(category) = &request.category
        && record.category.to_string() != category.to_lowercase()
    {
        return false;
    }

    if let Some(tag) = &request.tag {
        let tag = tag.to_lowercase();
        if !record.tags.iter().any(|t| t.to_lowercase() == tag) {
            return false;
        }
    }

    if let Some(since) = request.since
        && record.created_at < since
    {
        return false;
    }

    if let Some(text) = &request.text
        && !text.trim().is_empty()
    {
        let needle = text.to_lowercase();
        let content_match = record.content.to_lowercase().contains(&needle);
        let tag_match = record.tags.iter().any(|t| t.to_lowercase().contains(&needle));
        if !content_match && !tag_match {
            return false;
        }
    }

    true
}
