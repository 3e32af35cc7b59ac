//! Liveness endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::SharedState;

/// Display name reported by the root endpoint
pub const SERVICE_NAME: &str = "AI Model Benchmark API";

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub supported_formats: Vec<String>,
}

/// GET / - Fixed liveness message
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("{} is running", SERVICE_NAME),
    })
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_formats: state.specs.formats().map(str::to_string).collect(),
    })
}
