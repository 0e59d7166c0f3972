// OpenAI chat completions client

use crate::error::{LlmError, Result};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";
const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 4096;

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| LlmError::Configuration("Invalid OpenAI API key format".into()))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Value {
        let openai_messages: Vec<Value> = messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role(),
                    "content": msg.content(),
                })
            })
            .collect();

        let mut request = serde_json::json!({
            "model": model,
            "messages": openai_messages,
            "max_completion_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_COMPLETION_TOKENS),
        });

        if let (Some(temp), Some(obj)) = (options.temperature, request.as_object_mut()) {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }

        request
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options);

        tracing::debug!(model = %request.model, "Sending OpenAI chat completion");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                provider: PROVIDER.to_string(),
                status,
                body,
            });
        }

        let raw: Value = response.json().await?;
        let parsed: OpenAIChatResponse = serde_json::from_value(raw)
            .map_err(|e| LlmError::invalid_response(PROVIDER, e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response(PROVIDER, "no choices returned"))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| LlmError::invalid_response(PROVIDER, "choice has no content"))?;

        Ok(ChatResponse {
            content,
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_completion_token_limit() {
        let client = OpenAIClient::new("sk-test").unwrap();
        let payload = client.build_chat_request(
            "gpt-4o",
            &[Message::human("hi")],
            &ChatOptions::default(),
        );

        assert_eq!(payload["max_completion_tokens"], 4096);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert!(payload.get("temperature").is_none());
    }
}
