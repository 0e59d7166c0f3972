mod client;

pub use client::{AnthropicClient, ANTHROPIC_VERSION};
