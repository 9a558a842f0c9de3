//! Durability and locking behavior specific to the file backend

use fs2::FileExt;
use memento::identity::sanitize_user_id;
use memento::models::MemoryDraft;
use memento::storage::{FileStore, MemoryStore, SearchRequest, StorageError};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn store(dir: &TempDir) -> FileStore {
    FileStore::new(dir.path(), Duration::from_secs(2)).expect("file store")
}

#[tokio::test]
async fn user_file_name_is_sanitized() {
    let dir = TempDir::new().expect("tempdir");
    let store = store(&dir);

    store
        .create("user/../../etc", MemoryDraft::new("sneaky"))
        .await
        .expect("store");

    // The document lands inside the data directory under a sanitized name:
    // the path separators are gone, so no traversal is possible.
    let path = store.user_path("user/../../etc");
    assert!(path.parent() == Some(dir.path()));
    assert!(path.exists());
    let name = path.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(!name.contains('/'));
}

#[tokio::test]
async fn distinct_raw_ids_never_share_a_file() {
    let dir = TempDir::new().expect("tempdir");
    let store = store(&dir);

    // Both raw ids sanitize to the same prefix; the digest suffix keeps
    // their documents apart.
    store
        .create("team/alpha", MemoryDraft::new("for alpha"))
        .await
        .expect("store alpha");
    store
        .create("team:alpha", MemoryDraft::new("for colon-alpha"))
        .await
        .expect("store colon-alpha");

    assert_ne!(store.user_path("team/alpha"), store.user_path("team:alpha"));

    let records = store
        .search("team/alpha", &SearchRequest::default())
        .await
        .expect("search");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "for alpha");
}

#[tokio::test]
async fn concurrent_writers_get_distinct_ids() {
    let dir = TempDir::new().expect("tempdir");
    let store = std::sync::Arc::new(store(&dir));

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create("alice", MemoryDraft::new(format!("memory {i}")))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let record = handle.await.expect("join").expect("store");
        ids.push(record.id);
    }

    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}

#[tokio::test]
async fn stray_temp_file_does_not_shadow_the_document() {
    let dir = TempDir::new().expect("tempdir");
    let store = store(&dir);

    store
        .create("alice", MemoryDraft::new("survives the crash"))
        .await
        .expect("store");

    // Simulate a writer that died between serializing and renaming.
    let stray = dir.path().join(format!(
        ".{}.json.tmp-12345-67890",
        sanitize_user_id("alice")
    ));
    fs::write(&stray, b"{ truncated garb").expect("write stray temp");

    let records = store
        .search("alice", &SearchRequest::default())
        .await
        .expect("search");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "survives the crash");

    // The temp file is not a .json document, so it never shows up as a user.
    let users = store.list_users().await.expect("list");
    assert_eq!(users, vec!["alice".to_string()]);
}

#[tokio::test]
async fn corrupted_document_is_an_explicit_error() {
    let dir = TempDir::new().expect("tempdir");
    let store = store(&dir);

    store
        .create("alice", MemoryDraft::new("fine"))
        .await
        .expect("store");
    store
        .create("bob", MemoryDraft::new("also fine"))
        .await
        .expect("store");

    fs::write(store.user_path("alice"), b"not json at all").expect("corrupt");

    let err = store
        .search("alice", &SearchRequest::default())
        .await
        .expect_err("corrupted read");
    assert!(matches!(err, StorageError::Corrupted { .. }));

    let err = store
        .create("alice", MemoryDraft::new("new memory"))
        .await
        .expect_err("corrupted write");
    assert!(matches!(err, StorageError::Corrupted { .. }));

    // Other users are unaffected, and listing skips the bad document.
    let records = store
        .search("bob", &SearchRequest::default())
        .await
        .expect("search bob");
    assert_eq!(records.len(), 1);

    let users = store.list_users().await.expect("list");
    assert_eq!(users, vec!["bob".to_string()]);
}

#[tokio::test]
async fn time_window_excludes_older_records() {
    let dir = TempDir::new().expect("tempdir");
    let store = store(&dir);

    // Hand-write a document with two recent records and one 30 days old.
    let now = chrono::Utc::now();
    let old = now - chrono::Duration::days(30);
    let record = |id: i64, content: &str, at: chrono::DateTime<chrono::Utc>| {
        serde_json::json!({
            "id": id,
            "user_id": "alice",
            "content": content,
            "category": "general",
            "tags": [],
            "importance": 5,
            "metadata": {},
            "created_at": at,
            "updated_at": at,
        })
    };
    let document = serde_json::json!({
        "user_id": "alice",
        "last_updated": now,
        "total_memories": 3,
        "memories": [
            record(1, "old memory", old),
            record(2, "recent one", now - chrono::Duration::days(1)),
            record(3, "recent two", now),
        ],
    });
    fs::write(
        store.user_path("alice"),
        serde_json::to_string_pretty(&document).expect("serialize"),
    )
    .expect("write document");

    let request = SearchRequest {
        since: Some(now - chrono::Duration::days(7)),
        ..Default::default()
    };
    let records = store.search("alice", &request).await.expect("search");

    // Exactly the two recent records, newest first.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 3);
    assert_eq!(records[1].id, 2);

    let stats = store.stats("alice").await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.recent_7d, 2);
    assert_eq!(stats.oldest, Some(old));
}

#[tokio::test]
async fn held_lock_times_out_instead_of_hanging() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::new(dir.path(), Duration::from_millis(120)).expect("file store");

    let lock_path = dir
        .path()
        .join(format!("{}.lock", sanitize_user_id("alice")));
    let holder = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .expect("open lock file");
    holder.lock_exclusive().expect("hold lock");

    let err = store
        .create("alice", MemoryDraft::new("blocked"))
        .await
        .expect_err("lock held elsewhere");
    assert!(matches!(err, StorageError::LockTimeout { .. }));

    // Once the holder releases, writes go through again.
    fs2::FileExt::unlock(&holder).expect("release lock");
    store
        .create("alice", MemoryDraft::new("unblocked"))
        .await
        .expect("store after release");
}

#[tokio::test]
async fn writers_for_different_users_do_not_block_each_other() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::new(dir.path(), Duration::from_millis(120)).expect("file store");

    let lock_path = dir
        .path()
        .join(format!("{}.lock", sanitize_user_id("alice")));
    let holder = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .expect("open lock file");
    holder.lock_exclusive().expect("hold alice's lock");

    // Bob's lock is a different file entirely.
    store
        .create("bob", MemoryDraft::new("independent"))
        .await
        .expect("store for bob");
}
