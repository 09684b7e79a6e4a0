use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use bookmatch_api::api::{create_router, AppState};
use bookmatch_api::db::MemoryStore;
use bookmatch_api::error::{AppError, AppResult};
use bookmatch_api::models::{BookCandidate, BookId};
use bookmatch_api::services::providers::CatalogProvider;

/// Offline catalog stub: every search returns a couple of plausible books
#[derive(Clone)]
struct StubCatalog;

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn search(&self, query: &str, _language: &str) -> AppResult<Vec<BookCandidate>> {
        Ok(vec![
            BookCandidate {
                id: BookId::Isbn("9780000000001".to_string()),
                title: format!("First match for {}", query),
                authors: vec!["Stub Author".to_string()],
                categories: vec!["fantasy".to_string()],
                description: None,
                published_year: Some(2020),
                language: Some("en".to_string()),
            },
            BookCandidate {
                id: BookId::Isbn("9780000000002".to_string()),
                title: format!("Second match for {}", query),
                authors: vec!["Other Author".to_string()],
                categories: vec![],
                description: None,
                published_year: Some(2021),
                language: Some("en".to_string()),
            },
        ])
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<BookCandidate> {
        if isbn == "9780000000001" {
            Ok(BookCandidate {
                id: BookId::Isbn(isbn.to_string()),
                title: "Known Book".to_string(),
                authors: vec!["Stub Author".to_string()],
                categories: vec!["fantasy".to_string()],
                description: None,
                published_year: Some(2020),
                language: Some("en".to_string()),
            })
        } else {
            Err(AppError::NotFound(format!("No volume for ISBN {}", isbn)))
        }
    }

    fn clone_for_task(&self) -> Box<dyn CatalogProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server() -> TestServer {
    // No generative credential: every cycle takes the deterministic path
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(StubCatalog), None);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_record_and_list_signals() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    let response = server
        .post(&format!("/api/v1/users/{}/signals", user))
        .json(&json!({
            "kind": "liked",
            "book_id": "b1",
            "title": "Dune",
            "author": "Frank Herbert",
            "categories": ["science fiction"]
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/v1/users/{}/signals", user))
        .await;
    response.assert_status_ok();
    let signals: serde_json::Value = response.json();
    assert_eq!(signals["liked"].as_array().unwrap().len(), 1);
    assert_eq!(signals["liked"][0]["book_id"], "b1");
}

#[tokio::test]
async fn test_duplicate_signal_is_idempotent() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    for _ in 0..2 {
        let response = server
            .post(&format!("/api/v1/users/{}/signals", user))
            .json(&json!({
                "kind": "liked",
                "book_id": "b1",
                "title": "Dune",
                "author": "Frank Herbert"
            }))
            .await;
        response.assert_status_ok();
    }

    let response = server
        .get(&format!("/api/v1/users/{}/signals?kind=liked", user))
        .await;
    let signals: serde_json::Value = response.json();
    assert_eq!(signals["liked"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_signal_kind_rejected() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    let response = server
        .get(&format!("/api/v1/users/{}/signals?kind=wishlist", user))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_signal() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    server
        .post(&format!("/api/v1/users/{}/signals", user))
        .json(&json!({
            "kind": "read",
            "book_id": "b9",
            "title": "Emma",
            "author": "Jane Austen"
        }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&format!("/api/v1/users/{}/signals/b9", user))
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/v1/users/{}/signals", user))
        .await;
    let signals: serde_json::Value = response.json();
    assert!(signals["read"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_preferences_roundtrip() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    // Default profile before anything is set
    let response = server
        .get(&format!("/api/v1/users/{}/preferences", user))
        .await;
    response.assert_status_ok();
    let profile: serde_json::Value = response.json();
    assert_eq!(profile["language"], "en");
    assert_eq!(profile["onboarding_completed"], false);

    let response = server
        .put(&format!("/api/v1/users/{}/preferences", user))
        .json(&json!({
            "genres": ["Fantasy", "Mystery"],
            "language": "en",
            "goals": ["escape"],
            "story_vibes": ["epic"],
            "onboarding_completed": true
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/v1/users/{}/preferences", user))
        .await;
    let profile: serde_json::Value = response.json();
    assert_eq!(profile["genres"][0], "Fantasy");
    assert_eq!(profile["onboarding_completed"], true);
}

#[tokio::test]
async fn test_book_search_and_fetch() {
    let server = create_test_server();

    let response = server.get("/api/v1/books/search?q=dune").await;
    response.assert_status_ok();
    let books: Vec<serde_json::Value> = response.json();
    assert_eq!(books.len(), 2);

    let response = server.get("/api/v1/books/9780000000001").await;
    response.assert_status_ok();

    let response = server.get("/api/v1/books/0000000000000").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_for_new_user() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    let response = server
        .get(&format!("/api/v1/users/{}/recommendations", user))
        .await;
    response.assert_status_ok();

    let batch: serde_json::Value = response.json();
    assert_eq!(batch["stage"], "new");

    // Five deterministic directives, all resolved by the stub catalog
    let directives = batch["directives"].as_array().unwrap();
    assert_eq!(directives.len(), 5);
    for entry in directives {
        assert!(!entry["directive"]["query"].as_str().unwrap().is_empty());
        assert!(!entry["directive"]["reasoning"].as_str().unwrap().is_empty());
        let candidates = entry["candidates"].as_array().unwrap();
        assert!(!candidates.is_empty());
        for candidate in candidates {
            let score = candidate["score"].as_u64().unwrap();
            assert!(score <= 100);
        }
    }
}

#[tokio::test]
async fn test_recommendations_honor_declared_genre() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    server
        .put(&format!("/api/v1/users/{}/preferences", user))
        .json(&json!({ "genres": ["Fantasy"] }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/v1/users/{}/recommendations", user))
        .await;
    response.assert_status_ok();

    let batch: serde_json::Value = response.json();
    let first = &batch["directives"][0]["directive"];
    assert_eq!(first["focus"], "genre");
    assert!(first["query"].as_str().unwrap().contains("fantasy"));
}

#[tokio::test]
async fn test_recommendations_reach_established_stage() {
    let server = create_test_server();
    let user = Uuid::new_v4();

    for i in 0..20 {
        server
            .post(&format!("/api/v1/users/{}/signals", user))
            .json(&json!({
                "kind": "liked",
                "book_id": format!("b{}", i),
                "title": format!("Thriller {}", i),
                "author": "Lee Child",
                "categories": ["thriller"]
            }))
            .await
            .assert_status_ok();
    }

    let response = server
        .get(&format!("/api/v1/users/{}/recommendations", user))
        .await;
    response.assert_status_ok();

    let batch: serde_json::Value = response.json();
    assert_eq!(batch["stage"], "established");

    let first = &batch["directives"][0]["directive"];
    assert_eq!(first["focus"], "author");
    assert!(first["query"].as_str().unwrap().contains("lee child"));
}
