use crate::config::{ClientFactory, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::traits::{ChatClient, ChatOptions, ChatRequest};
use crate::types::Message;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps provider names to clients and runs one-shot generations.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<String, Arc<dyn ChatClient>>,
    options: ChatOptions,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: impl IntoIterator<Item = ProviderConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(ClientFactory::create_chat_client(config)?);
        }
        Ok(registry)
    }

    /// Register a client under its provider name. Replaces any previous one.
    pub fn register(&mut self, client: Arc<dyn ChatClient>) {
        self.clients
            .insert(client.provider().to_ascii_lowercase(), client);
    }

    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.register(client);
        self
    }

    /// Options sent with every generation, e.g. a completion token cap.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, provider: &str) -> Result<Arc<dyn ChatClient>> {
        self.clients
            .get(&provider.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| LlmError::UnsupportedProvider(provider.to_string()))
    }

    /// Send `prompt` as a single user message and return the completion text.
    ///
    /// Unknown providers fail before any network call is made.
    pub async fn generate(&self, prompt: &str, provider: &str, model: &str) -> Result<String> {
        let client = self.get(provider)?;

        let start = std::time::Instant::now();
        let response = client
            .chat(
                ChatRequest::new(model, vec![Message::human(prompt)])
                    .with_options(self.options.clone()),
            )
            .await?;

        tracing::info!(
            provider = %provider,
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            output_tokens = response.usage.as_ref().map(|u| u.output_tokens),
            "LLM generation completed"
        );

        Ok(response.content)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
