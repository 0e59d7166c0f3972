use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn invalid_response(provider: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}
