//! Drives the full stack: flat-file store, assistant and HTTP router, with a mock model.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use documind_core::{Assistant, Config};
use documind_gateway::{AppState, build_router};
use documind_llm::any::AnyProvider;
use documind_llm::mock::MockProvider;
use documind_memory::IndexStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn app(
    dir: &tempfile::TempDir,
    provider: Option<MockProvider>,
) -> (axum::Router, IndexStore) {
    let mut config = Config::default();
    config.storage.index_dir = dir.path().join("indexed");

    let store = IndexStore::open(&config.storage.index_dir).await.unwrap();
    let assistant = Assistant::new(
        store.clone(),
        config.retrieval.retriever(),
        config.retrieval.prompt_builder(),
        provider.map(AnyProvider::Mock),
        config.llm.model.clone(),
    );
    let router = build_router(
        AppState::new(Arc::new(assistant)),
        config.gateway.max_body_size,
        config.gateway.cors,
    );
    (router, store)
}

async fn post(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn index_then_chat_grounds_answer() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockProvider::with_responses(vec!["Objects keep their state of motion.".into()]);
    let (app, store) = app(&dir, Some(mock.clone())).await;

    let (status, json) = post(
        &app,
        "/api/index",
        serde_json::json!({
            "collection": "physics101",
            "source": "physics.pdf",
            "totalPages": 10,
            "chunks": [
                {"text": "Newton's first law of motion", "page": 1},
                {"text": "Thermodynamics overview", "page": 5}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert!(store.load("physics101").await.unwrap().is_some());

    let (status, json) = post(
        &app,
        "/api/chat",
        serde_json::json!({"question": "What is Newton's law?", "collection": " physics101 "}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer_markdown"], "Objects keep their state of motion.");
    assert_eq!(json["sources_markdown"], "Source: Document 'physics101'");

    let prompt = mock.last_prompt().unwrap();
    assert!(prompt.contains("Context (from document):\n(page 1) Newton's first law of motion\n\n"));
    assert!(!prompt.contains("Thermodynamics"));
}

#[tokio::test]
async fn reindexing_replaces_previous_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockProvider::default();
    let (app, _store) = app(&dir, Some(mock.clone())).await;

    for text in ["entropy always increases", "gravity bends light"] {
        let (status, _) = post(
            &app,
            "/api/index",
            serde_json::json!({"collection": "notes", "chunks": [{"text": text}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = post(
        &app,
        "/api/chat",
        serde_json::json!({"question": "entropy?", "collection": "notes"}),
    )
    .await;
    assert_eq!(
        json["sources_markdown"],
        "Source: Document 'notes' (no high-overlap chunks found)"
    );
    assert!(!mock.last_prompt().unwrap().contains("entropy always increases"));
}

#[tokio::test]
async fn chat_without_collection_sends_bare_prompt_with_requested_model() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockProvider::default();
    let (app, _store) = app(&dir, Some(mock.clone())).await;

    let (status, json) = post(
        &app,
        "/api/chat",
        serde_json::json!({"question": "Say hi", "collection": "", "model": "gemini-2.0-pro"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sources_markdown"], "");

    let (prompt, model) = mock.recorded().pop().unwrap();
    assert_eq!(model, "gemini-2.0-pro");
    assert!(prompt.ends_with("Question: Say hi\n\nAnswer in markdown."));
}

#[tokio::test]
async fn indexing_works_without_model_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir, None).await;

    let (status, _) = post(
        &app,
        "/api/index",
        serde_json::json!({"collection": "offline", "chunks": [{"text": "kept"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post(&app, "/api/chat", serde_json::json!({"question": "kept?"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Gemini API not configured");

    assert_eq!(store.clear().await.unwrap(), 1);
}
