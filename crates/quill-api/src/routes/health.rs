use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Server is accepting requests", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
    })
}

/// Health check endpoint
///
/// Reports the version and which backends this instance is wired to
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    services.insert("search".to_string(), state.orchestrator.backend_name().to_string());
    services.insert("providers".to_string(), state.orchestrator.providers().join(","));
    services.insert("threads".to_string(), state.thread_backend().to_string());
    services.insert("mode".to_string(), state.orchestrator.config().mode.to_string());

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
