//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use retention_core::EngineStatus;
use serde::Serialize;

use super::ApiResponse;
use crate::AppState;

pub const ENDPOINTS: &[&str] = &[
    "GET /api/health",
    "POST /api/predict/student",
    "POST /api/predict/batch",
];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: DateTime<Utc>,
    model_status: EngineStatus,
    max_batch_size: usize,
    endpoints: &'static [&'static str],
}

pub async fn check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let model_status = state.slot.status();

    ApiResponse::ok(HealthResponse {
        status: if model_status.model_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: Utc::now(),
        model_status,
        max_batch_size: state.service.max_batch_size(),
        endpoints: ENDPOINTS,
    })
}
