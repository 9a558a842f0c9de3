//! Memory service orchestrating the parser and the persistence layer
//!
//! The service is the single entry point callers use: it validates input,
//! runs natural-language text through the command parser, and dispatches to
//! whichever storage backend was configured. It keeps no authoritative copy
//! of any record; every operation reads or writes through the store.

use crate::config::MementoConfig;
use crate::models::{Category, MemoryDraft, MemoryRecord, MemoryStats};
use crate::parser::{self, ParsedCommand};
use crate::storage::{MemoryStore, SearchRequest};
use crate::{MementoError, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Structured recall parameters for callers that bypass natural language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallRequest {
    /// Free-text filter over content and tags
    pub query: Option<String>,

    /// Category filter
    pub category: Option<String>,

    /// Restrict results to the last `days_back` days
    pub days_back: Option<u32>,

    /// Maximum number of records; the configured default applies when absent
    pub limit: Option<usize>,
}

/// Orchestrates parsing, validation, and persistence for user memories
#[derive(Clone)]
pub struct MemoryService {
    store: Arc<dyn MemoryStore>,
    config: MementoConfig,
}

impl MemoryService {
    /// Create a service over an already-opened storage backend.
    pub fn new(store: Arc<dyn MemoryStore>, config: MementoConfig) -> Self {
        Self { store, config }
    }

    /// Store a structured memory draft for `user_id`.
    pub async fn store(&self, user_id: &str, draft: MemoryDraft) -> Result<MemoryRecord> {
        self.validate_user(user_id)?;

        let trimmed_len = draft.content.trim().chars().count();
        if trimmed_len == 0 {
            return Err(MementoError::Validation(
                "memory content must not be empty".to_string(),
            ));
        }
        if trimmed_len > self.config.storage.max_content_length {
            return Err(MementoError::Validation(format!(
                "memory content exceeds the {} character limit",
                self.config.storage.max_content_length
            )));
        }

        let record = self.store.create(user_id, draft).await?;
        info!(user_id, id = record.id, category = %record.category, "memory stored");
        Ok(record)
    }

    /// Store a memory from free-form natural language.
    ///
    /// The text is run through the command parser. A `Store` result supplies
    /// content, category, tags, and importance. Anything else (an ambiguous
    /// command, or a recall-shaped sentence handed to a store call) degrades
    /// gracefully: the whole text becomes the content with defaults, because
    /// refusing to persist is worse than storing with a generic category.
    pub async fn store_text(&self, user_id: &str, text: &str) -> Result<MemoryRecord> {
        let draft = match parser::parse(text) {
            ParsedCommand::Store {
                content,
                category,
                tags,
                importance,
            } => {
                let mut draft = MemoryDraft::new(content);
                draft.category = category;
                draft.tags = tags;
                draft.importance = importance;
                draft
            }
            other => {
                debug!(user_id, ?other, "non-store parse result, storing full text");
                MemoryDraft::new(text.trim())
            }
        };

        self.store(user_id, draft).await
    }

    /// Recall memories using structured parameters.
    ///
    /// Returns the matching records newest first; no matches is an empty
    /// list, never an error.
    pub async fn recall(&self, user_id: &str, request: RecallRequest) -> Result<Vec<MemoryRecord>> {
        self.validate_user(user_id)?;

        let search = SearchRequest {
            text: request.query.filter(|q| !q.trim().is_empty()),
            category: request.category,
            tag: None,
            since: request
                .days_back
                .map(|days| Utc::now() - Duration::days(days as i64)),
            limit: request.limit.unwrap_or(self.config.storage.default_limit),
        };

        let records = self.store.search(user_id, &search).await?;
        debug!(user_id, count = records.len(), "recall completed");
        Ok(records)
    }

    /// Recall memories from free-form natural language.
    ///
    /// A `Recall` parse supplies the query, category, and time window. A
    /// `Store` parse on what the caller declared a recall is treated as a
    /// caller mistake: its content becomes the query text. An ambiguous
    /// parse searches with the raw text.
    pub async fn recall_text(&self, user_id: &str, text: &str) -> Result<Vec<MemoryRecord>> {
        let request = match parser::parse(text) {
            ParsedCommand::Recall {
                query,
                category,
                days_back,
                limit,
            } => RecallRequest {
                query: Some(query),
                category: category.as_ref().map(Category::to_string),
                days_back,
                limit: Some(limit),
            },
            ParsedCommand::Store { content, .. } => RecallRequest {
                query: Some(content),
                ..Default::default()
            },
            ParsedCommand::Ambiguous { raw_text } => RecallRequest {
                query: Some(raw_text.trim().to_string()),
                ..Default::default()
            },
        };

        self.recall(user_id, request).await
    }

    /// Aggregate statistics for one user's memories.
    pub async fn summary(&self, user_id: &str) -> Result<MemoryStats> {
        self.validate_user(user_id)?;
        Ok(self.store.stats(user_id).await?)
    }

    /// All user identifiers with at least one stored record. Administrative.
    pub async fn list_users(&self) -> Result<Vec<String>> {
        Ok(self.store.list_users().await?)
    }

    /// Parse text without touching storage. Diagnostic.
    pub fn parse(&self, text: &str) -> ParsedCommand {
        parser::parse(text)
    }

    /// Check that the underlying store is reachable and writable.
    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.store.health_check().await?)
    }

    /// Release storage resources.
    pub async fn shutdown(&self) -> Result<()> {
        Ok(self.store.close().await?)
    }

    /// The active configuration.
    pub fn config(&self) -> &MementoConfig {
        &self.config
    }

    fn validate_user(&self, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(MementoError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryService")
            .field("backend", &self.config.storage.backend)
            .field("data_dir", &self.config.storage.data_dir)
            .finish()
    }
}
