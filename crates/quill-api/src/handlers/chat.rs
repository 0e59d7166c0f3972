use axum::{extract::State, Json};
use quill_types::{ChatRequest, ChatResponse, RetrievalMode};
use std::sync::Arc;

use crate::handlers::record_turn;
use crate::{error::ApiResult, state::AppState};

/// Answer a question with a single retrieval round
#[utoipa::path(
    post,
    path = "/journal_chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Grounded answer", body = ChatResponse),
        (status = 400, description = "Unsupported provider"),
        (status = 502, description = "Model provider failed")
    ),
    tag = "chat"
)]
pub async fn journal_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    run_turn(&state, req.with_mode(RetrievalMode::SingleShot)).await
}

/// Answer a question with iterative agentic retrieval
#[utoipa::path(
    post,
    path = "/journal_chat_agent",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Grounded answer", body = ChatResponse),
        (status = 400, description = "Unsupported provider"),
        (status = 502, description = "Model provider failed")
    ),
    tag = "chat"
)]
pub async fn journal_chat_agent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    run_turn(&state, req.with_mode(RetrievalMode::Agentic)).await
}

async fn run_turn(state: &AppState, req: ChatRequest) -> ApiResult<Json<ChatResponse>> {
    let query = req.query.clone();
    let response = state.orchestrator.run(req).await?;

    if state.config.threads.record_turns {
        if let Some(thread_id) = &response.thread_id {
            record_turn(state.threads.as_ref(), thread_id, &query, &response.response).await;
        }
    }

    Ok(Json(response))
}
