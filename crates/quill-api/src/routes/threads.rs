use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use quill_types::{Message, Thread};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "initial_message")]
    pub initial_message: Option<Message>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenameThreadRequest {
    pub title: String,
}

/// Thread metadata without its messages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ThreadSummary {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            message_count: thread.messages.len(),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadSummary>,
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = Thread)
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    let thread = state
        .threads
        .create_thread(req.title, req.initial_message)
        .await?;

    tracing::info!(thread_id = %thread.id, title = %thread.title, "Thread created");
    Ok((StatusCode::CREATED, Json(thread)))
}

/// List threads, most recently updated first
#[utoipa::path(
    get,
    path = "/threads",
    responses(
        (status = 200, description = "List of threads", body = ListThreadsResponse)
    ),
    tag = "threads"
)]
pub async fn list_threads(State(state): State<Arc<AppState>>) -> ApiResult<Json<ListThreadsResponse>> {
    let threads = state.threads.list_threads().await?;

    Ok(Json(ListThreadsResponse {
        threads: threads.into_iter().map(ThreadSummary::from).collect(),
    }))
}

/// Get a specific thread by ID
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread with its messages", body = Thread),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Thread>> {
    Ok(Json(state.threads.get_thread(&thread_id).await?))
}

/// Rename a thread
#[utoipa::path(
    put,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = RenameThreadRequest,
    responses(
        (status = 200, description = "Thread renamed", body = Thread),
        (status = 400, description = "Blank title"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn rename_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<RenameThreadRequest>,
) -> ApiResult<Json<Thread>> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be blank".to_string()));
    }

    Ok(Json(state.threads.rename_thread(&thread_id, title).await?))
}

/// Delete a thread and its messages
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.threads.delete_thread(&thread_id).await?;

    tracing::info!(thread_id = %thread_id, "Thread deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// List the messages of a thread in conversation order
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Messages", body = [Message]),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.threads.get_messages(&thread_id).await?))
}

/// Append a message to a thread
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = Message,
    responses(
        (status = 201, description = "Message appended", body = Message),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn append_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(message): Json<Message>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    state
        .threads
        .append_message(&thread_id, message.clone())
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
