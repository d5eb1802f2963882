//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use retention_core::{PredictionError, ValidationError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request errors
    #[error("Request body must be JSON")]
    InvalidRequest { details: Option<String> },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Expected 'students' array or direct array")]
    InvalidFormat,

    #[error("Students data must be non-empty array")]
    InvalidData,

    // Pipeline errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("Endpoint not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { .. }
            | AppError::MissingFields(_)
            | AppError::InvalidFormat
            | AppError::InvalidData => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictionError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictionError::ModelUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Prediction(PredictionError::BatchTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest { .. } => "INVALID_REQUEST",
            AppError::MissingFields(_) => "MISSING_FIELDS",
            AppError::InvalidFormat => "INVALID_FORMAT",
            AppError::InvalidData => "INVALID_DATA",
            AppError::Prediction(e) => e.code(),
            AppError::NotFound => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            AppError::InvalidRequest { details } => details.clone(),
            AppError::Prediction(PredictionError::BatchTooLarge { max, .. }) => {
                Some(format!("Maximum batch size is {}", max))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Prediction(PredictionError::ModelUnavailable(_)) => {
                tracing::error!("Prediction requested but no model is loaded")
            }
            other => tracing::debug!("Request rejected ({}): {}", other.code(), other),
        }

        let mut error = json!({
            "message": self.to_string(),
            "code": self.code(),
            "timestamp": chrono::Utc::now(),
        });
        if let Some(details) = self.details() {
            error["details"] = json!(details);
        }

        let body = Json(json!({
            "success": false,
            "error": error,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Prediction(err.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            details: Some(rejection.body_text()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}
