//! Prediction Module
//!
//! Single and batch risk prediction on top of features, model and
//! explanation rules.

pub mod service;
pub mod tiers;
pub mod types;


pub use service::{PredictionService, DEFAULT_MAX_BATCH_SIZE};
pub use tiers::{RiskLevel, TierThresholds, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use types::{BatchItem, BatchResult, BatchSummary, ItemError, PredictionResult};
