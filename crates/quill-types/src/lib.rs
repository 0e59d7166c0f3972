pub mod chat;
pub mod config;
pub mod entry;
pub mod events;
pub mod message;

pub use chat::{ChatRequest, ChatResponse, DEFAULT_TOP_K};
pub use config::{OrchestratorConfig, RetrievalMode};
pub use entry::{JournalEntry, RetrievedDoc};
pub use events::{SearchIteration, StreamEvent, GENERIC_FAILURE_MESSAGE};
pub use message::{Message, Role, Thread};
