//! Relational storage backend backed by SQLite
//!
//! A single `memories` table keyed by `(user_id, id)` holds every user's
//! records. Every statement carries a `WHERE user_id = ?` predicate; per-user
//! id allocation happens inside the same transaction as the insert so
//! concurrent writers for one user can never mint duplicate ids.

use crate::models::{Category, MemoryDraft, MemoryRecord, MemoryStats};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::{
    matches, validate_draft, validate_request, validate_user_id, MemoryStore, SearchRequest,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS memories (
    user_id       TEXT NOT NULL,
    id            INTEGER NOT NULL,
    content       TEXT NOT NULL,
    category      TEXT NOT NULL DEFAULT 'general',
    tags_json     TEXT NOT NULL DEFAULT '[]',
    importance    INTEGER NOT NULL DEFAULT 5,
    metadata_json TEXT NOT NULL DEFAULT '{}',
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    PRIMARY KEY (user_id, id)
);
CREATE INDEX IF NOT EXISTS idx_memories_user_category ON memories(user_id, category);
CREATE INDEX IF NOT EXISTS idx_memories_user_created ON memories(user_id, created_at);
";

/// SQLite-backed [`MemoryStore`]
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.as_ref().display(), "sqlite store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Useful for tests; data does not survive
    /// the store.
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Backend("connection mutex poisoned".to_string()))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MemoryRecord> {
        let category: String = row.get("category")?;
        let tags_json: String = row.get("tags_json")?;
        let metadata_json: String = row.get("metadata_json")?;

        Ok(MemoryRecord {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            content: row.get("content")?,
            category: Category::from_str(&category),
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            importance: row.get("importance")?,
            metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn create(&self, user_id: &str, mut draft: MemoryDraft) -> StorageResult<MemoryRecord> {
        validate_user_id(user_id)?;
        draft.normalize();
        validate_draft(&draft)?;

        let now = Utc::now();
        let tags_json = serde_json::to_string(&draft.tags)?;
        let metadata_json = serde_json::to_string(&draft.metadata)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Per-user id allocation must share the insert's transaction.
        let id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM memories WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO memories
                 (user_id, id, content, category, tags_json, importance, metadata_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                id,
                draft.content,
                draft.category.to_string(),
                tags_json,
                draft.importance,
                metadata_json,
                now,
                now,
            ],
        )?;
        tx.commit()?;

        debug!(user_id, id, "stored memory");

        Ok(MemoryRecord {
            id,
            user_id: user_id.to_string(),
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            importance: draft.importance,
            metadata: draft.metadata,
            created_at: now,
            updated_at: now,
        })
    }

    async fn search(
        &self,
        user_id: &str,
        request: &SearchRequest,
    ) -> StorageResult<Vec<MemoryRecord>> {
        validate_user_id(user_id)?;
        validate_request(request)?;

        // The user_id predicate is mandatory on every read.
        let mut sql = String::from("SELECT * FROM memories WHERE user_id = ?1");
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(category) = &request.category {
            params.push(Box::new(category.to_lowercase()));
            sql.push_str(&format!(" AND category = ?{}", params.len()));
        }

        if let Some(since) = request.since {
            params.push(Box::new(since));
            sql.push_str(&format!(" AND created_at >= ?{}", params.len()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        // Tag and text matching need full Unicode case folding, which SQL
        // LIKE cannot provide; those filters run through the reference
        // predicate on the fetched rows. The SQL LIMIT only applies when no
        // row can be discarded after the fetch.
        let filters_rows = request.tag.is_some()
            || request.text.as_ref().is_some_and(|t| !t.trim().is_empty());
        if !filters_rows {
            params.push(Box::new(request.limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            // Both backends answer through the same reference filter.
            if matches(&record, request) {
                records.push(record);
            }
        }
        records.truncate(request.limit);

        debug!(user_id, count = records.len(), "search completed");
        Ok(records)
    }

    async fn stats(&self, user_id: &str) -> StorageResult<MemoryStats> {
        validate_user_id(user_id)?;

        let conn = self.lock()?;

        let total: u64 = conn.query_row(
            "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        let mut by_category = BTreeMap::new();
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM memories WHERE user_id = ?1 GROUP BY category",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;
        for row in rows {
            let (category, count) = row?;
            by_category.insert(category, count);
        }

        let week_ago = Utc::now() - Duration::days(7);
        let recent_7d: u64 = conn.query_row(
            "SELECT COUNT(*) FROM memories WHERE user_id = ?1 AND created_at >= ?2",
            params![user_id, week_ago],
            |row| row.get(0),
        )?;

        let oldest = conn
            .query_row(
                "SELECT MIN(created_at) FROM memories WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        let newest = conn
            .query_row(
                "SELECT MAX(created_at) FROM memories WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok(MemoryStats {
            total,
            by_category,
            recent_7d,
            oldest,
            newest,
        })
    }

    async fn list_users(&self) -> StorageResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT user_id FROM memories ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(true)
    }

    async fn close(&self) -> StorageResult<()> {
        // The connection is closed when the store is dropped.
        Ok(())
    }
}
