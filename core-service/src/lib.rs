//! Student Retention - Risk Inference Core
//!
//! Turns raw per-student attributes into a dropout-risk assessment:
//! probability, tier, contributing factors and recommendations.
//!
//! ```no_run
//! use std::sync::Arc;
//! use retention_core::{ForestClassifier, ModelSlot, PredictionService, StudentRecord};
//!
//! let slot = Arc::new(ModelSlot::with_reference());
//! let service = PredictionService::new(ForestClassifier::new(slot));
//! let result = service.predict_one(&StudentRecord::new(2.1, 0.6, 12))?;
//! println!("{} {}", result.risk_level, result.risk_score);
//! # Ok::<(), retention_core::PredictionError>(())
//! ```

pub mod config;
pub mod error;
pub mod logic;

pub use config::ServiceConfig;
pub use error::{
    ConfigError, DomainClampWarning, ModelError, ModelUnavailable, PredictionError, RuleError,
    ValidationError,
};
pub use logic::explain::{Explanation, ExplanationEngine, RuleTable};
pub use logic::features::{FeatureEngineer, FeatureVector, RecordDefaults, StudentRecord};
pub use logic::model::{EngineStatus, ForestClassifier, ModelSlot, RiskClassifier, TreeEnsemble};
pub use logic::prediction::{
    BatchItem, BatchResult, BatchSummary, ItemError, PredictionResult, PredictionService, RiskLevel,
    TierThresholds,
};
pub use logic::synthetic::generate_cohort;
