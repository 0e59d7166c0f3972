use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use quill_orchestrator::Orchestrator;
use quill_stream::{event_payload, open_stream};
use quill_types::{ChatRequest, StreamEvent, GENERIC_FAILURE_MESSAGE};
use std::convert::Infallible;
use std::sync::Arc;

use crate::handlers::record_turn;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Events buffered between the orchestrator and a slow client.
const EVENT_BUFFER: usize = 64;

/// Answer a question, streaming search progress as Server-Sent Events
///
/// Emits one `search_iteration` event per retrieval round, then a single
/// `chat_response` event, or an `error` event if the turn fails.
#[utoipa::path(
    post,
    path = "/journal_chat/stream",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "Unsupported provider")
    ),
    tag = "chat"
)]
pub async fn journal_chat_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // Reject before opening the stream so the client gets a proper status
    if !state.orchestrator.supports_provider(&req.provider) {
        return Err(ApiError::UnsupportedProvider(req.provider));
    }

    let (sink, events) = open_stream(EVENT_BUFFER);
    let orchestrator = Arc::clone(&state.orchestrator);
    let threads = Arc::clone(&state.threads);
    let record = state.config.threads.record_turns;

    // The turn is recorded before `chat_response` goes out, so a client that
    // has read the whole stream sees it in the thread. Dropping the event
    // stream (client disconnect) cancels the turn.
    tokio::spawn(async move {
        let result = orchestrator.stream_turn(&req, &sink).await;
        if let (true, Ok(response)) = (record, &result) {
            if let Some(thread_id) = &response.thread_id {
                record_turn(threads.as_ref(), thread_id, &req.query, &response.response).await;
            }
        }
        let _ = Orchestrator::finish(sink, result).await;
    });

    let sse_stream = events.map(|event| Ok::<Event, Infallible>(to_sse_event(&event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &StreamEvent) -> Event {
    match event_payload(event) {
        Ok((name, data)) => Event::default().event(name).data(data),
        Err(e) => {
            tracing::error!("Failed to encode {} event: {}", event.event_name(), e);
            Event::default()
                .event(StreamEvent::ERROR)
                .data(serde_json::json!({ "error": GENERIC_FAILURE_MESSAGE }).to_string())
        }
    }
}
