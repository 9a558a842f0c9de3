//! Integration tests for the Memento CLI
//!
//! These tests exercise the flows the CLI drives end to end: building a
//! service from flag-style settings, storing through the tool adapter with
//! comma-split tags the way the `store` subcommand does, recalling with the
//! flags-win merge the `recall` subcommand uses, and the `users` and
//! `summary` listings. The service and adapter are driven in-process against
//! a scratch data directory, matching the structure used in main.rs.

use memento::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Helper mirroring `build_service` in main.rs for a given backend name.
async fn build_test_service(dir: &TempDir, backend: StorageBackend) -> MemoryService {
    let config = ConfigBuilder::defaults()
        .with_backend(backend)
        .with_data_dir(dir.path())
        .with_quiet_logging()
        .build()
        .expect("build config");
    memento::init(config).await.expect("init service")
}

/// Split a `--tags` flag value the way the store subcommand does.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

#[tokio::test]
async fn store_subcommand_flow_persists_and_reports() {
    let dir = TempDir::new().expect("tempdir");
    let service = build_test_service(&dir, StorageBackend::File).await;
    let adapter = ToolAdapter::new(service);

    let reply = adapter
        .dispatch(ToolCall::StoreMemory {
            user_id: "alice".to_string(),
            text: Some("remember that the office meeting moved to 3 PM".to_string()),
            content: None,
            category: None,
            tags: Some(split_tags("calendar, Schedule ")),
            importance: Some(7),
            metadata: None,
        })
        .await
        .expect("dispatch store");

    assert_eq!(reply["success"], json!(true));
    assert_eq!(reply["memory_id"], json!(1));
    assert_eq!(reply["category"], json!("work"));
    assert_eq!(reply["tags"], json!(["calendar", "Schedule"]));
    assert_eq!(reply["importance"], json!(7));
    // The table renderer prints this field; it must always be present.
    assert!(reply["message"].as_str().is_some());
}

#[tokio::test]
async fn recall_subcommand_flow_merges_flags_and_query() {
    let dir = TempDir::new().expect("tempdir");
    let service = build_test_service(&dir, StorageBackend::File).await;

    service
        .store_text("alice", "remember that I talked about work travel plans")
        .await
        .expect("store work");
    service
        .store_text("alice", "remember that my friend moved house")
        .await
        .expect("store personal");

    // Natural language fills the open flags (query, category, window).
    let request = RecallRequest {
        query: Some("about work".to_string()),
        category: Some("work".to_string()),
        days_back: Some(14),
        limit: None,
    };
    let records = service.recall("alice", request).await.expect("recall");
    assert_eq!(records.len(), 1);
    assert!(records[0].content.contains("work travel"));

    // An explicit category flag narrows past what the text alone would match.
    let request = RecallRequest {
        query: None,
        category: Some("personal".to_string()),
        days_back: None,
        limit: None,
    };
    let records = service.recall("alice", request).await.expect("recall");
    assert_eq!(records.len(), 1);
    assert!(records[0].content.contains("friend"));
}

#[tokio::test]
async fn users_and_summary_listings() {
    let dir = TempDir::new().expect("tempdir");
    let service = build_test_service(&dir, StorageBackend::File).await;
    let adapter = ToolAdapter::new(service.clone());

    service
        .store_text("alice", "remember that a")
        .await
        .expect("store alice");
    service
        .store_text("bob", "remember that b")
        .await
        .expect("store bob");

    let reply = adapter.dispatch(ToolCall::ListMemoryUsers).await.expect("users");
    assert_eq!(reply["user_count"], json!(2));
    assert_eq!(reply["users"], json!(["alice", "bob"]));

    let reply = adapter
        .dispatch(ToolCall::GetMemorySummary {
            user_id: "alice".to_string(),
        })
        .await
        .expect("summary");
    assert_eq!(reply["user_id"], json!("alice"));
    assert_eq!(reply["total"], json!(1));
}

#[tokio::test]
async fn sqlite_backend_selection_works_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let service = build_test_service(&dir, StorageBackend::Sqlite).await;

    service
        .store_text("alice", "remember that sqlite holds this one")
        .await
        .expect("store");

    let records = service
        .recall("alice", RecallRequest::default())
        .await
        .expect("recall");
    assert_eq!(records.len(), 1);

    // The database file landed in the chosen data directory.
    assert!(dir.path().join("memento.db").exists());
}

#[tokio::test]
async fn json_parse_output_is_machine_readable() {
    let dir = TempDir::new().expect("tempdir");
    let service = build_test_service(&dir, StorageBackend::File).await;

    let parsed = service.parse("remember that the demo is Friday #launch");
    let value = serde_json::to_value(&parsed).expect("serialize");
    assert_eq!(value["intent"], json!("store"));
    assert_eq!(value["tags"], json!(["launch"]));
}
