use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_orchestrator::TurnError;
use quill_persist::PersistError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Turn failed: {0}")]
    Turn(TurnError),

    #[error("Persistence error: {0}")]
    Persist(PersistError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::UnsupportedProvider(provider) => Self::UnsupportedProvider(provider),
            other => Self::Turn(other),
        }
    }
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ThreadNotFound(id) => Self::ThreadNotFound(id),
            other => Self::Persist(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ThreadNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::UnsupportedProvider(ref provider) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported provider: {provider}"),
            ),
            ApiError::Turn(ref e) => {
                // Vendor details stay in the logs
                tracing::error!("Turn error: {}", e);
                (StatusCode::BAD_GATEWAY, e.user_message())
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use quill_llm::LlmError;
    use quill_types::GENERIC_FAILURE_MESSAGE;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::ThreadNotFound("t".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::UnsupportedProvider("gemini".into()), StatusCode::BAD_REQUEST),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_failed_turn_hides_vendor_body() {
        let error = ApiError::from(TurnError::from(LlmError::Provider {
            provider: "openai".into(),
            status: 429,
            body: "quota exceeded for org-123".into(),
        }));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_persist_not_found_maps_to_404() {
        let error = ApiError::from(PersistError::ThreadNotFound("t-1".into()));
        assert!(matches!(error, ApiError::ThreadNotFound(ref id) if id == "t-1"));
    }
}
