//! HTTP handlers

pub mod health;
pub mod predict;

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;

/// Success envelope shared by all endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            timestamp: Utc::now(),
        })
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
