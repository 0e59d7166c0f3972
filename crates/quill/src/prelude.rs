//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use quill::prelude::*;
//! ```

pub use crate::{
    ChatRequest, ChatResponse, JournalEntry, Message, OrchestratorConfig, RetrievalMode,
    RetrievedDoc, SearchIteration, StreamEvent, Thread,
    ChatClient, ProviderConfig, ProviderRegistry,
    ElasticsearchBackend, ElasticsearchConfig, InMemoryBackend, SearchBackend,
    InMemoryThreadStore, ThreadStore,
    ChatStreamClient, StreamError,
    Orchestrator, OrchestratorBuilder, TurnError,
};
