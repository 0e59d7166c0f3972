use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chat::DEFAULT_TOP_K;

/// How a turn gathers grounding entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Classify once, retrieve once.
    SingleShot,
    /// Multi-round tool search with progress events.
    #[default]
    Agentic,
}

impl std::fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleShot => f.write_str("single_shot"),
            Self::Agentic => f.write_str("agentic"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub mode: RetrievalMode,
    /// Upper bound on agentic retrieval rounds.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
    /// Token budget for the assembled context block. `None` disables trimming.
    #[serde(default)]
    pub max_context_tokens: Option<usize>,
}

fn default_max_rounds() -> usize {
    4
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_max_top_k() -> usize {
    50
}

fn default_recent_count() -> usize {
    7
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::default(),
            max_rounds: default_max_rounds(),
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            recent_count: default_recent_count(),
            max_context_tokens: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn with_recent_count(mut self, n: usize) -> Self {
        self.recent_count = n;
        self
    }

    pub fn with_max_context_tokens(mut self, tokens: usize) -> Self {
        self.max_context_tokens = Some(tokens);
        self
    }

    /// Rounds allowed for a turn in the given mode.
    pub fn rounds_for(&self, mode: RetrievalMode) -> usize {
        match mode {
            RetrievalMode::SingleShot => 1,
            RetrievalMode::Agentic => self.max_rounds.max(1),
        }
    }
}
