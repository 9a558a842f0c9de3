//! Tool-call boundary for external transports
//!
//! Surrounding hosts (MCP servers, function-calling glue, CLIs) talk to the
//! memory system through a small set of named tool calls. This module models
//! those calls as a tagged enum, dispatches them against a
//! [`MemoryService`], and serializes replies as plain JSON values so the
//! transport layer never needs to know the internal types.
//!
//! Explicitly supplied arguments always override values derived from parsing
//! the natural-language text, mirroring how the surrounding assistants use
//! these tools.

use crate::models::{Category, MemoryDraft};
use crate::parser::{self, DeclaredIntent, ParsedCommand};
use crate::service::{MemoryService, RecallRequest};
use crate::{MementoError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A tool invocation as received from the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    /// Store a memory, from raw text or structured fields
    StoreMemory {
        /// Owning user
        user_id: String,
        /// Natural-language command; parsed for content and attributes
        #[serde(default)]
        text: Option<String>,
        /// Explicit content; overrides anything parsed from `text`
        #[serde(default)]
        content: Option<String>,
        /// Explicit category override
        #[serde(default)]
        category: Option<String>,
        /// Explicit tags override
        #[serde(default)]
        tags: Option<Vec<String>>,
        /// Explicit importance override
        #[serde(default)]
        importance: Option<u8>,
        /// Optional metadata attached verbatim
        #[serde(default)]
        metadata: Option<HashMap<String, Value>>,
    },
    /// Search a user's memories
    RecallMemories {
        /// Owning user
        user_id: String,
        /// Natural-language query; parsed for filters
        #[serde(default)]
        query: Option<String>,
        /// Explicit category override
        #[serde(default)]
        category: Option<String>,
        /// Explicit time-window override
        #[serde(default)]
        days_back: Option<u32>,
        /// Maximum number of results
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Aggregate statistics for one user
    GetMemorySummary {
        /// Owning user
        user_id: String,
    },
    /// Parse a command without touching storage (diagnostic)
    ParseMemoryCommand {
        /// Text to parse
        text: String,
        /// Force the store or recall branch instead of classifying
        #[serde(default)]
        command_type: Option<DeclaredIntent>,
    },
    /// List all users with stored memories (administrative)
    ListMemoryUsers,
}

/// Translates tool calls into service operations and JSON replies
#[derive(Debug, Clone)]
pub struct ToolAdapter {
    service: MemoryService,
}

impl ToolAdapter {
    /// Wrap a service in the tool-call boundary.
    pub fn new(service: MemoryService) -> Self {
        Self { service }
    }

    /// Dispatch one tool call, returning the JSON reply.
    ///
    /// Validation and storage failures propagate as errors; the transport
    /// decides how to surface them.
    pub async fn dispatch(&self, call: ToolCall) -> Result<Value> {
        match call {
            ToolCall::StoreMemory {
                user_id,
                text,
                content,
                category,
                tags,
                importance,
                metadata,
            } => {
                self.store_memory(user_id, text, content, category, tags, importance, metadata)
                    .await
            }
            ToolCall::RecallMemories {
                user_id,
                query,
                category,
                days_back,
                limit,
            } => self.recall_memories(user_id, query, category, days_back, limit).await,
            ToolCall::GetMemorySummary { user_id } => {
                let stats = self.service.summary(&user_id).await?;
                let mut reply = serde_json::to_value(&stats)
                    .map_err(|e| MementoError::Other(e.to_string()))?;
                if let Value::Object(map) = &mut reply {
                    map.insert("user_id".to_string(), json!(user_id));
                }
                Ok(reply)
            }
            ToolCall::ParseMemoryCommand { text, command_type } => {
                let parsed = match command_type {
                    Some(intent) => parser::parse_as(&text, intent),
                    None => parser::parse(&text),
                };
                Ok(json!({
                    "original_text": text,
                    "parsed": parsed,
                }))
            }
            ToolCall::ListMemoryUsers => {
                let users = self.service.list_users().await?;
                Ok(json!({
                    "users": users,
                    "user_count": users.len(),
                }))
            }
        }
    }

    /// Dispatch a call serialized as JSON, folding errors into the reply.
    ///
    /// Convenience for transports that want a reply for every request:
    /// failures become `{"success": false, "error": ...}` instead of a
    /// transport-level fault.
    pub async fn dispatch_json(&self, raw: &str) -> Value {
        let call: ToolCall = match serde_json::from_str(raw) {
            Ok(call) => call,
            Err(e) => {
                return json!({
                    "success": false,
                    "error": format!("malformed tool call: {e}"),
                });
            }
        };

        match self.dispatch(call).await {
            Ok(reply) => reply,
            Err(e) => json!({
                "success": false,
                "error": e.to_string(),
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn store_memory(
        &self,
        user_id: String,
        text: Option<String>,
        content: Option<String>,
        category: Option<String>,
        tags: Option<Vec<String>>,
        importance: Option<u8>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Value> {
        // Start from the parsed command, then let explicit arguments win.
        let mut draft = match text.as_deref().map(parser::parse) {
            Some(ParsedCommand::Store {
                content,
                category,
                tags,
                importance,
            }) => {
                let mut draft = MemoryDraft::new(content);
                draft.category = category;
                draft.tags = tags;
                draft.importance = importance;
                draft
            }
            Some(_) => MemoryDraft::new(text.as_deref().unwrap_or_default().trim()),
            None => MemoryDraft::default(),
        };

        if let Some(content) = content {
            draft.content = content;
        }
        if let Some(category) = category {
            draft.category = Category::from_str(&category);
        }
        if let Some(tags) = tags {
            draft.tags = tags;
        }
        if let Some(importance) = importance {
            draft.importance = importance;
        }
        if let Some(metadata) = metadata {
            draft.metadata = metadata;
        }

        let record = self.service.store(&user_id, draft).await?;
        Ok(json!({
            "success": true,
            "memory_id": record.id,
            "user_id": record.user_id,
            "content": record.content,
            "category": record.category.to_string(),
            "tags": record.tags,
            "importance": record.importance,
            "message": format!("Memory stored successfully with ID {}", record.id),
        }))
    }

    async fn recall_memories(
        &self,
        user_id: String,
        query: Option<String>,
        category: Option<String>,
        days_back: Option<u32>,
        limit: Option<usize>,
    ) -> Result<Value> {
        // Parse the query text for filters, then let explicit arguments win.
        let mut request = match query.as_deref().map(parser::parse) {
            Some(ParsedCommand::Recall {
                query,
                category,
                days_back,
                limit,
            }) => RecallRequest {
                query: Some(query),
                category: category.as_ref().map(Category::to_string),
                days_back,
                limit: Some(limit),
            },
            _ => RecallRequest {
                query: query.clone(),
                ..Default::default()
            },
        };

        if let Some(category) = category {
            request.category = Some(category);
        }
        if days_back.is_some() {
            request.days_back = days_back;
        }
        if limit.is_some() {
            request.limit = limit;
        }

        let memories = self.service.recall(&user_id, request).await?;
        Ok(json!({
            "success": true,
            "user_id": user_id,
            "count": memories.len(),
            "memories": memories,
        }))
    }
}
