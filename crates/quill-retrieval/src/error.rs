use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Failures talking to a search backend.
///
/// The gateway absorbs these into fallback results; they never fail a turn.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    #[error("Search backend error ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to decode search results: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for RetrievalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for RetrievalError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
