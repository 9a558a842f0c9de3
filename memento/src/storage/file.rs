//! File-based storage backend: one JSON document per user
//!
//! Each user's memories live in `{data_dir}/{sanitized_key}.json`. Writers
//! hold an exclusive advisory lock on a `.lock` sidecar for the whole
//! read-modify-write cycle, then publish the new document with a
//! write-to-temp-file-then-rename step so a partially written file is never
//! observable. Readers need no lock: they see either the fully-old or the
//! fully-new document. Locks are scoped to one user's file, so writers for
//! different users never block each other.

use crate::identity::sanitize_user_id;
use crate::models::{MemoryDraft, MemoryRecord, MemoryStats};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::{
    matches, validate_draft, validate_request, validate_user_id, MemoryStore, SearchRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a writer sleeps between advisory-lock attempts
const LOCK_RETRY_SLEEP: Duration = Duration::from_millis(25);

/// The on-disk document holding one user's memories
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    user_id: String,
    last_updated: DateTime<Utc>,
    total_memories: usize,
    memories: Vec<MemoryRecord>,
}

impl UserDocument {
    fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            last_updated: Utc::now(),
            total_memories: 0,
            memories: Vec::new(),
        }
    }
}

/// File-backed [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    /// `lock_timeout` bounds how long a writer waits for the per-user lock.
    pub fn new<P: Into<PathBuf>>(root: P, lock_timeout: Duration) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!(root = %root.display(), "file store initialized");
        Ok(Self { root, lock_timeout })
    }

    /// Path of the JSON document for `user_id`.
    pub fn user_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_user_id(user_id)))
    }

    fn lock_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.lock", sanitize_user_id(user_id)))
    }

    /// Acquire the exclusive advisory lock for one user's file, waiting at
    /// most `lock_timeout`. The lock is released when the returned handle is
    /// dropped, on every exit path.
    fn acquire_lock(path: &Path, key: &str, timeout: Duration) -> StorageResult<File> {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(lock_file),
                Err(_) if Instant::now() < deadline => std::thread::sleep(LOCK_RETRY_SLEEP),
                Err(_) => {
                    return Err(StorageError::LockTimeout {
                        key: key.to_string(),
                        waited_ms: timeout.as_millis() as u64,
                    });
                }
            }
        }
    }

    /// Load a user's document, distinguishing "no document yet" from a
    /// document that exists but cannot be interpreted.
    fn load_document(path: &Path, key: &str) -> StorageResult<Option<UserDocument>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupted {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Atomically publish `document` at `path`: serialize to a unique temp
    /// file in the same directory, flush it to disk, then rename over the
    /// target. The rename is the atomicity boundary.
    fn write_document(path: &Path, document: &UserDocument) -> StorageResult<()> {
        let parent = path.parent().ok_or_else(|| {
            StorageError::Backend(format!("user file has no parent directory: {}", path.display()))
        })?;

        let tmp_path = parent.join(format!(
            ".{}.tmp-{}-{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("user"),
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        ));

        let result = (|| -> StorageResult<()> {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(serde_json::to_string_pretty(document)?.as_bytes())?;
            tmp.sync_all()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();

        if result.is_err() {
            // The target file is untouched; only the temp file needs cleanup.
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    async fn create(&self, user_id: &str, mut draft: MemoryDraft) -> StorageResult<MemoryRecord> {
        validate_user_id(user_id)?;
        draft.normalize();
        validate_draft(&draft)?;

        let key = sanitize_user_id(user_id);
        let path = self.user_path(user_id);
        let lock_path = self.lock_path(user_id);
        let timeout = self.lock_timeout;
        let user_id = user_id.to_string();

        let record = tokio::task::spawn_blocking(move || -> StorageResult<MemoryRecord> {
            // Held across the whole read-modify-write-rename cycle.
            let _lock = Self::acquire_lock(&lock_path, &key, timeout)?;

            let mut document =
                Self::load_document(&path, &key)?.unwrap_or_else(|| UserDocument::empty(&user_id));

            let id = document.memories.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            let now = Utc::now();
            let record = MemoryRecord {
                id,
                user_id: user_id.clone(),
                content: draft.content,
                category: draft.category,
                tags: draft.tags,
                importance: draft.importance,
                metadata: draft.metadata,
                created_at: now,
                updated_at: now,
            };

            document.memories.push(record.clone());
            document.total_memories = document.memories.len();
            document.last_updated = now;

            Self::write_document(&path, &document)?;
            debug!(user_id = %record.user_id, id, "stored memory");
            Ok(record)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("blocking task failed: {e}")))??;

        Ok(record)
    }

    async fn search(
        &self,
        user_id: &str,
        request: &SearchRequest,
    ) -> StorageResult<Vec<MemoryRecord>> {
        validate_user_id(user_id)?;
        validate_request(request)?;

        let key = sanitize_user_id(user_id);
        let path = self.user_path(user_id);
        let request = request.clone();

        let records = tokio::task::spawn_blocking(move || -> StorageResult<Vec<MemoryRecord>> {
            let Some(document) = Self::load_document(&path, &key)? else {
                return Ok(Vec::new());
            };

            let mut records: Vec<MemoryRecord> = document
                .memories
                .into_iter()
                .filter(|record| matches(record, &request))
                .collect();

            records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            records.truncate(request.limit);
            Ok(records)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("blocking task failed: {e}")))??;

        debug!(user_id, count = records.len(), "search completed");
        Ok(records)
    }

    async fn stats(&self, user_id: &str) -> StorageResult<MemoryStats> {
        validate_user_id(user_id)?;

        let key = sanitize_user_id(user_id);
        let path = self.user_path(user_id);

        tokio::task::spawn_blocking(move || -> StorageResult<MemoryStats> {
            let Some(document) = Self::load_document(&path, &key)? else {
                return Ok(MemoryStats::default());
            };

            let mut stats = MemoryStats {
                total: document.memories.len() as u64,
                ..Default::default()
            };

            let week_ago = Utc::now() - ChronoDuration::days(7);
            for record in &document.memories {
                *stats
                    .by_category
                    .entry(record.category.to_string())
                    .or_insert(0) += 1;
                if record.created_at >= week_ago {
                    stats.recent_7d += 1;
                }
            }
            stats.oldest = document.memories.iter().map(|m| m.created_at).min();
            stats.newest = document.memories.iter().map(|m| m.created_at).max();
            Ok(stats)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("blocking task failed: {e}")))?
    }

    async fn list_users(&self) -> StorageResult<Vec<String>> {
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> StorageResult<Vec<String>> {
            let mut users = Vec::new();
            for entry in fs::read_dir(&root)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                // A document a crashed writer left corrupted should not hide
                // the rest of the listing.
                match fs::read_to_string(&path)
                    .ok()
                    .and_then(|raw| serde_json::from_str::<UserDocument>(&raw).ok())
                {
                    Some(document) if !document.memories.is_empty() => {
                        users.push(document.user_id)
                    }
                    Some(_) => {}
                    None => warn!(path = %path.display(), "skipping unreadable user document"),
                }
            }
            users.sort();
            users.dedup();
            Ok(users)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("blocking task failed: {e}")))?
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let probe = self.root.join(".health-probe");

        tokio::task::spawn_blocking(move || -> StorageResult<bool> {
            fs::write(&probe, b"ok")?;
            fs::remove_file(&probe)?;
            Ok(true)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("blocking task failed: {e}")))?
    }

    async fn close(&self) -> StorageResult<()> {
        // Nothing held open between operations.
        Ok(())
    }
}
