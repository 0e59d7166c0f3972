use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use quill_api::{build_router, config::Config, state::AppState};
use quill_llm::{ChatClient, ChatRequest, ChatResponse, LlmError, ProviderRegistry};
use quill_orchestrator::OrchestratorBuilder;
use quill_persist::{InMemoryThreadStore, ThreadStore};
use quill_retrieval::InMemoryBackend;
use quill_stream::FrameDecoder;
use quill_types::{JournalEntry, StreamEvent, GENERIC_FAILURE_MESSAGE};
use serde_json::{json, Value};
use tower::ServiceExt;

const CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [search]
    backend = "memory"

    [orchestrator]
    mode = "agentic"
    max_rounds = 3

    [logging]
    level = "info"
    format = "pretty"
"#;

struct StubClient {
    fail_status: Option<u16>,
}

#[async_trait]
impl ChatClient for StubClient {
    fn provider(&self) -> &str {
        "stub"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
        if let Some(status) = self.fail_status {
            return Err(LlmError::Provider {
                provider: "stub".into(),
                status,
                body: "internal vendor trace id 42".into(),
            });
        }
        Ok(ChatResponse {
            content: "you ran twice by the river".into(),
            usage: None,
            finish_reason: None,
        })
    }
}

fn journal() -> Vec<JournalEntry> {
    vec![
        JournalEntry::new("1", "Morning run", "running along the river", "2024-04-01"),
        JournalEntry::new("2", "Evening run", "running again, legs tired", "2024-04-03"),
        JournalEntry::new("3", "Work", "long meetings", "2024-04-10"),
    ]
}

struct TestApp {
    router: Router,
    threads: Arc<dyn ThreadStore>,
}

fn app_with(fail_status: Option<u16>) -> TestApp {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let threads: Arc<dyn ThreadStore> = Arc::new(InMemoryThreadStore::new());

    let orchestrator = OrchestratorBuilder::new()
        .search_backend(Arc::new(InMemoryBackend::new(journal())))
        .providers(Arc::new(
            ProviderRegistry::new().with_client(Arc::new(StubClient { fail_status })),
        ))
        .thread_store(Arc::clone(&threads))
        .config(config.orchestrator.clone())
        .build()
        .unwrap();

    let state = Arc::new(AppState::new(config, orchestrator, Arc::clone(&threads)));
    TestApp {
        router: build_router(state),
        threads,
    }
}

fn app() -> TestApp {
    app_with(None)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn chat_body(query: &str) -> Value {
    json!({ "query": query, "topK": 5, "provider": "stub", "model": "m" })
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_status_is_ready() {
    let app = app();
    let (status, body) = send_json(&app.router, "GET", "/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready" }));
}

#[tokio::test]
async fn test_health_reports_backends() {
    let app = app();
    let (status, body) = send_json(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["search"], "memory");
    assert_eq!(body["services"]["providers"], "stub");
    assert_eq!(body["services"]["threads"], "memory");
}

#[tokio::test]
async fn test_openapi_document_lists_chat_routes() {
    let app = app();
    let (status, body) = send_json(&app.router, "GET", "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/journal_chat").is_some());
    assert!(body["paths"].get("/journal_chat/stream").is_some());
    assert!(body["paths"].get("/threads/{thread_id}").is_some());
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_journal_chat_returns_answer_and_docs() {
    let app = app();
    let (status, body) =
        send_json(&app.router, "POST", "/journal_chat", Some(chat_body("how was my running?"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "you ran twice by the river");
    let ids: Vec<&str> = body["docs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["entry"]["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"1"));
    assert!(ids.contains(&"2"));
    assert!(!ids.contains(&"3"));
}

#[tokio::test]
async fn test_journal_chat_agent_accepts_snake_case_payload() {
    let app = app();
    let body = json!({
        "query": "and after that?",
        "top_k": 2,
        "provider": "stub",
        "model": "m",
        "existing_docs": [{ "id": "9", "title": "Trip", "content": "drove north", "date": "2024-02-01" }],
        "message_history": [{ "sender": "user", "text": "tell me about the trip" }]
    });
    let (status, body) = send_json(&app.router, "POST", "/journal_chat_agent", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["docs"][0]["entry"]["id"], "9");
    assert_eq!(body["docs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsupported_provider_is_bad_request() {
    let app = app();
    let body = json!({ "query": "how was my running?", "provider": "gemini", "model": "m" });

    let (status, resp) = send_json(&app.router, "POST", "/journal_chat", Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "unsupported provider: gemini");

    let (status, _) = send(&app.router, "POST", "/journal_chat/stream", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway_with_generic_message() {
    let app = app_with(Some(429));
    let (status, body) =
        send_json(&app.router, "POST", "/journal_chat", Some(chat_body("how was my running?"))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], GENERIC_FAILURE_MESSAGE);
    assert!(!body.to_string().contains("trace id"));
}

#[tokio::test]
async fn test_turn_is_recorded_on_thread() {
    let app = app();
    let thread = app.threads.create_thread(Some("Runs".into()), None).await.unwrap();

    let mut body = chat_body("how was my running?");
    body["threadId"] = json!(thread.id);
    let (status, resp) = send_json(&app.router, "POST", "/journal_chat", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["threadId"], json!(thread.id));

    let messages = app.threads.get_messages(&thread.id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "how was my running?");
    assert_eq!(messages[1].content, "you ran twice by the river");
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

fn decode(bytes: &[u8]) -> Vec<StreamEvent> {
    let mut decoder = FrameDecoder::new();
    let mut events: Vec<StreamEvent> = decoder
        .feed(bytes)
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    events.extend(decoder.finish().into_iter().map(|r| r.unwrap()));
    events
}

#[tokio::test]
async fn test_stream_emits_iterations_then_response() {
    let app = app();
    let (status, bytes) = send(
        &app.router,
        "POST",
        "/journal_chat/stream",
        Some(chat_body("how was my running?")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events = decode(&bytes);
    let (last, rest) = events.split_last().unwrap();

    assert!(!rest.is_empty());
    for (i, event) in rest.iter().enumerate() {
        match event {
            StreamEvent::SearchIteration(it) => assert_eq!(it.iteration as usize, i + 1),
            other => panic!("unexpected event before completion: {other:?}"),
        }
    }
    match last {
        StreamEvent::ChatResponse(resp) => assert_eq!(resp.response, "you ran twice by the river"),
        other => panic!("expected chat_response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_failure_ends_with_error_event() {
    let app = app_with(Some(500));
    let (status, bytes) = send(
        &app.router,
        "POST",
        "/journal_chat/stream",
        Some(chat_body("how was my running?")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    match decode(&bytes).last() {
        Some(StreamEvent::Error { message }) => assert_eq!(message, GENERIC_FAILURE_MESSAGE),
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_streamed_turn_is_on_thread_when_stream_ends() {
    let app = app();
    let thread = app.threads.create_thread(Some("Runs".into()), None).await.unwrap();

    let mut body = chat_body("how was my running?");
    body["threadId"] = json!(thread.id);
    let (status, bytes) = send(&app.router, "POST", "/journal_chat/stream", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(matches!(decode(&bytes).last(), Some(StreamEvent::ChatResponse(_))));

    let messages = app.threads.get_messages(&thread.id).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["how was my running?", "you ran twice by the river"]);
}

#[tokio::test]
async fn test_failed_streamed_turn_is_not_recorded() {
    let app = app_with(Some(500));
    let thread = app.threads.create_thread(None, None).await.unwrap();

    let mut body = chat_body("how was my running?");
    body["threadId"] = json!(thread.id);
    let (_, bytes) = send(&app.router, "POST", "/journal_chat/stream", Some(body)).await;

    assert!(matches!(decode(&bytes).last(), Some(StreamEvent::Error { .. })));
    assert!(app.threads.get_messages(&thread.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_thread_lifecycle() {
    let app = app();

    let (status, created) = send_json(
        &app.router,
        "POST",
        "/threads",
        Some(json!({ "title": "Spring", "initialMessage": { "role": "user", "content": "hello" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["messages"].as_array().unwrap().len(), 1);

    let (status, renamed) = send_json(
        &app.router,
        "PUT",
        &format!("/threads/{id}"),
        Some(json!({ "title": "Spring runs" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["title"], "Spring runs");

    let (status, _) = send_json(
        &app.router,
        "POST",
        &format!("/threads/{id}/messages"),
        Some(json!({ "role": "assistant", "content": "hi there" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, messages) = send_json(&app.router, "GET", &format!("/threads/{id}/messages"), None).await;
    let contents: Vec<&str> = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["hello", "hi there"]);

    let (_, listed) = send_json(&app.router, "GET", "/threads", None).await;
    assert_eq!(listed["threads"][0]["id"], id.as_str());
    assert_eq!(listed["threads"][0]["messageCount"], 2);

    let (status, _) = send(&app.router, "DELETE", &format!("/threads/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app.router, "GET", &format!("/threads/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn test_blank_rename_is_rejected() {
    let app = app();
    let thread = app.threads.create_thread(None, None).await.unwrap();

    let (status, _) = send_json(
        &app.router,
        "PUT",
        &format!("/threads/{}", thread.id),
        Some(json!({ "title": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_append_to_missing_thread_is_not_found() {
    let app = app();
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/threads/missing/messages",
        Some(json!({ "role": "user", "content": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
