mod assembler;
mod budget;
mod templates;

pub use assembler::{AssembledContext, ContextAssembler, EntryBlock};
pub use budget::TokenBudget;
pub use templates::{build_prompt, CURRENT_CONVERSATION_HEADER, PREVIOUS_CONVERSATION_HEADER, REUSED_ENTRIES_LEAD_IN};
