//! Error types for the inference pipeline

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::logic::features::LayoutMismatchError;

// ============================================================================
// VALIDATION
// ============================================================================

/// A single student record could not be turned into features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a finite number")]
    NonFinite { field: &'static str },

    #[error("Malformed student record: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "MISSING_FIELDS",
            ValidationError::NonFinite { .. } => "INVALID_VALUE",
            ValidationError::Malformed(_) => "INVALID_REQUEST",
        }
    }
}

/// Non-fatal: a value outside its domain was clamped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainClampWarning {
    pub field: &'static str,
    pub value: f64,
    pub clamped_to: f64,
}

impl std::fmt::Display for DomainClampWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} out of range, clamped to {}", self.field, self.value, self.clamped_to)
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// No trained model is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Model not available")]
pub struct ModelUnavailable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ModelUnavailable(#[from] ModelUnavailable),

    #[error("Batch of {size} records exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

impl PredictionError {
    pub fn code(&self) -> &'static str {
        match self {
            PredictionError::Validation(e) => e.code(),
            PredictionError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PredictionError::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
        }
    }
}

// ============================================================================
// MODEL ARTIFACTS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("Invalid tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("Model artifact contains no trees")]
    Empty,
}

// ============================================================================
// RULE TABLES
// ============================================================================

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to read rule table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule '{rule}' references unknown feature '{feature}'")]
    UnknownFeature { rule: String, feature: String },

    #[error("Rule '{rule}' is invalid: {reason}")]
    InvalidRule { rule: String, reason: String },
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Rules(#[from] RuleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationError::MissingField("current_gpa").code(), "MISSING_FIELDS");
        assert_eq!(PredictionError::from(ModelUnavailable).code(), "MODEL_UNAVAILABLE");
        assert_eq!(
            PredictionError::BatchTooLarge { size: 5, max: 2 }.code(),
            "BATCH_TOO_LARGE"
        );
        assert_eq!(
            PredictionError::from(ValidationError::NonFinite { field: "age" }).code(),
            "INVALID_VALUE"
        );
    }

    #[test]
    fn test_messages() {
        let err = PredictionError::from(ValidationError::MissingField("total_credits"));
        assert_eq!(err.to_string(), "Missing required field: total_credits");

        let warning = DomainClampWarning { field: "current_gpa", value: 4.5, clamped_to: 4.0 };
        assert_eq!(warning.to_string(), "current_gpa = 4.5 out of range, clamped to 4");
    }
}
