use quill_llm::LlmError;
use quill_types::GENERIC_FAILURE_MESSAGE;
use thiserror::Error;

/// Why a turn ended in `Failed`.
#[derive(Error, Debug)]
pub enum TurnError {
    /// The model vendor call failed. The original error is kept for logs.
    #[error("Generation failed: {0}")]
    Provider(LlmError),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The client stopped listening before the turn finished.
    #[error("Turn cancelled by client disconnect")]
    Cancelled,
}

impl TurnError {
    /// Text safe to show an end user. Never contains vendor response bodies.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedProvider(provider) => format!("unsupported provider: {provider}"),
            Self::Provider(_) | Self::Cancelled => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<LlmError> for TurnError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::UnsupportedProvider(provider) => Self::UnsupportedProvider(provider),
            other => Self::Provider(other),
        }
    }
}
