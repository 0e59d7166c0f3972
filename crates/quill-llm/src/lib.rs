pub mod anthropic;
pub mod config;
pub mod error;
pub mod openai;
pub mod registry;
pub mod traits;
pub mod types;

pub use anthropic::AnthropicClient;
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use registry::ProviderRegistry;
pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
pub use types::Message;
