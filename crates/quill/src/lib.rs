//! # Quill
//!
//! Ask questions about your own journal and get answers grounded in the
//! entries that matter.
//!
//! ## Overview
//!
//! A turn goes through a small state machine:
//!
//! - **Retrieval decision**: reuse entries from the previous turn, or classify
//!   the question (`recent`, `vector`, or too short to search)
//! - **Retrieval**: one round (`single_shot`) or a bounded agentic loop that
//!   picks a tool per round and stops when nothing new turns up
//! - **Context build**: entries, thread history and unsaved history, trimmed
//!   to a token budget
//! - **Generation**: exactly one call to the chosen model provider
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = ProviderRegistry::from_configs([ProviderConfig::anthropic(
//!         std::env::var("ANTHROPIC_API_KEY")?,
//!     )])?;
//!
//!     let orchestrator = OrchestratorBuilder::new()
//!         .search_backend(Arc::new(InMemoryBackend::from_file("data/journal_fixtures.json")?))
//!         .providers(Arc::new(registry))
//!         .build()?;
//!
//!     let request = ChatRequest::new("how have I been sleeping?", "anthropic", "claude-sonnet-4-5");
//!     let response = orchestrator.run(request).await?;
//!
//!     println!("{}", response.response);
//!     for doc in &response.docs {
//!         println!("  - {} ({})", doc.entry.title, doc.entry.date);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`quill-types`**: wire types shared by every crate
//! - **`quill-llm`**: provider-agnostic generation (OpenAI, Anthropic)
//! - **`quill-retrieval`**: intent classification and the search gateway
//! - **`quill-context`**: grounding text assembly and token budgeting
//! - **`quill-persist`**: thread storage, in memory or MongoDB
//! - **`quill-stream`**: Server-Sent Events framing for progress and results
//! - **`quill-orchestrator`**: the turn state machine and agentic planner

pub mod prelude;

pub use quill_types::{
    ChatRequest, ChatResponse, JournalEntry, Message, OrchestratorConfig, RetrievalMode,
    RetrievedDoc, Role, SearchIteration, StreamEvent, Thread, GENERIC_FAILURE_MESSAGE,
};

pub use quill_llm::{
    AnthropicClient, ChatClient, ChatOptions, ClientFactory, LlmError, OpenAIClient,
    ProviderConfig, ProviderRegistry, ProviderType,
};

pub use quill_retrieval::{
    classify, ElasticsearchBackend, ElasticsearchConfig, InMemoryBackend, Retrieval,
    RetrievalError, RetrievalGateway, RetrievalSource, SearchBackend, SearchIntent,
};

pub use quill_context::{build_prompt, AssembledContext, ContextAssembler, EntryBlock, TokenBudget};

pub use quill_persist::{InMemoryThreadStore, PersistError, ThreadStore};

#[cfg(feature = "mongodb")]
pub use quill_persist::MongoThreadStore;

pub use quill_stream::{
    consume, consume_stream, decode_events, open_stream, ChatStreamClient, EventSink, EventStream,
    FrameDecoder, StreamError,
};

pub use quill_orchestrator::{
    HeuristicPlanner, Orchestrator, OrchestratorBuilder, SearchPlanner, SearchTool, TurnError,
    TurnState,
};
