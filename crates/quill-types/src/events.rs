use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chat::ChatResponse;

/// Text shown to end users when a turn or stream fails. Vendor error bodies
/// are never surfaced.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "sorry, something went wrong while answering. please try again.";

/// Progress record for one agentic retrieval round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchIteration {
    /// 1-based round number.
    pub iteration: u32,
    pub tool: String,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub results_count: usize,
    pub new_entries_added: usize,
}

/// Events emitted while a turn runs.
///
/// A stream carries zero or more `SearchIteration` events followed by exactly
/// one terminal event, either `ChatResponse` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    SearchIteration(SearchIteration),
    ChatResponse(ChatResponse),
    Error { message: String },
}

impl StreamEvent {
    pub const SEARCH_ITERATION: &'static str = "search_iteration";
    pub const CHAT_RESPONSE: &'static str = "chat_response";
    pub const ERROR: &'static str = "error";

    /// Name used for the SSE `event:` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SearchIteration(_) => Self::SEARCH_ITERATION,
            Self::ChatResponse(_) => Self::CHAT_RESPONSE,
            Self::Error { .. } => Self::ERROR,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::SearchIteration(_))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
