use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::RetrievalMode;
use crate::entry::{JournalEntry, RetrievedDoc};
use crate::message::Message;

pub const DEFAULT_TOP_K: usize = 5;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// A single user turn sent to the orchestrator.
///
/// When `existing_docs` is non-empty, retrieval is skipped and those entries
/// are reused as grounding context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub query: String,
    #[serde(default = "default_top_k", alias = "top_k")]
    pub top_k: usize,
    pub provider: String,
    pub model: String,
    #[serde(default, alias = "thread_id")]
    pub thread_id: Option<String>,
    #[serde(default, alias = "message_history")]
    pub message_history: Option<Vec<Message>>,
    #[serde(default, alias = "existing_docs")]
    pub existing_docs: Option<Vec<JournalEntry>>,
    /// Overrides the server's configured retrieval mode for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RetrievalMode>,
}

impl ChatRequest {
    pub fn new(
        query: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            provider: provider.into(),
            model: model.into(),
            thread_id: None,
            message_history: None,
            existing_docs: None,
            mode: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.message_history = Some(history);
        self
    }

    pub fn with_existing_docs(mut self, docs: Vec<JournalEntry>) -> Self {
        self.existing_docs = Some(docs);
        self
    }

    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Entries carried over from a previous turn, if any were supplied.
    pub fn reusable_docs(&self) -> Option<&[JournalEntry]> {
        self.existing_docs
            .as_deref()
            .filter(|docs| !docs.is_empty())
    }

    pub fn history(&self) -> &[Message] {
        self.message_history.as_deref().unwrap_or_default()
    }
}

/// Terminal result of a turn.
///
/// `docs` is the final de-duplicated entry set used as grounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub docs: Vec<RetrievedDoc>,
    #[serde(default)]
    pub thread_id: Option<String>,
}
