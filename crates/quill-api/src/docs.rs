use axum::Json;
use utoipa::OpenApi;

use quill_types::{
    ChatRequest, ChatResponse, JournalEntry, Message, RetrievalMode, RetrievedDoc, Role,
    SearchIteration, Thread,
};

use crate::handlers::{chat, stream};
use crate::routes::{health, threads};

#[derive(OpenApi)]
#[openapi(
    info(title = "Quill API", description = "Journal chat with retrieval-augmented answers"),
    paths(
        health::status,
        health::health_check,
        chat::journal_chat,
        chat::journal_chat_agent,
        stream::journal_chat_stream,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::rename_thread,
        threads::delete_thread,
        threads::list_messages,
        threads::append_message,
    ),
    components(schemas(
        ChatRequest,
        ChatResponse,
        JournalEntry,
        RetrievedDoc,
        RetrievalMode,
        SearchIteration,
        Message,
        Role,
        Thread,
        threads::CreateThreadRequest,
        threads::RenameThreadRequest,
        threads::ThreadSummary,
        threads::ListThreadsResponse,
        health::StatusResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "chat", description = "Grounded question answering"),
        (name = "threads", description = "Conversation threads"),
        (name = "messages", description = "Thread messages"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the whole API
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
