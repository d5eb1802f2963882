//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use retention_core::{BatchItem, BatchSummary, PredictionResult, StudentRecord};
use serde::Serialize;
use serde_json::Value;

use super::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub const REQUIRED_FIELDS: &[&str] = &["current_gpa", "attendance_rate", "total_credits"];

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<BatchItem>,
    pub total_students: usize,
    pub summary: BatchSummary,
    pub batch_processed_at: DateTime<Utc>,
}

/// POST /api/predict/student
pub async fn student(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<PredictionResult>>> {
    let Json(body) = body?;
    if !body.is_object() {
        return Err(AppError::InvalidRequest {
            details: Some("expected a JSON object".to_string()),
        });
    }

    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    let record = StudentRecord::from_json(&body)?;
    let result = state.service.predict_one(&record)?;

    tracing::info!(
        "Predicted {}: {} ({:.3})",
        result.student_id,
        result.risk_level,
        result.risk_score
    );

    Ok(ApiResponse::ok(result))
}

/// POST /api/predict/batch
///
/// Accepts `{"students": [...]}` or a bare array.
pub async fn batch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<BatchResponse>>> {
    let Json(body) = body?;

    let students = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("students") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(AppError::InvalidData),
            None => return Err(AppError::InvalidFormat),
        },
        _ => return Err(AppError::InvalidFormat),
    };

    if students.is_empty() {
        return Err(AppError::InvalidData);
    }

    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict_many_json(&students)).await??;

    tracing::info!(
        "Batch of {} processed: {} ok, {} failed",
        result.summary.total,
        result.summary.succeeded,
        result.summary.failed
    );

    Ok(ApiResponse::ok(BatchResponse {
        total_students: result.len(),
        summary: result.summary,
        batch_processed_at: result.processed_at,
        predictions: result.items,
    }))
}

fn missing_fields(body: &Value) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| body.get(**field).map_or(true, Value::is_null))
        .map(|field| field.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_lists_all_absent_or_null() {
        let body = json!({"current_gpa": 3.1, "attendance_rate": null});
        assert_eq!(missing_fields(&body), vec!["attendance_rate", "total_credits"]);
        assert!(missing_fields(&json!({"current_gpa": 1, "attendance_rate": 1, "total_credits": 1})).is_empty());
    }
}
