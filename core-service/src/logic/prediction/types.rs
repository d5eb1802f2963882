//! Prediction Types
//!
//! Result shapes returned to the serving layer. No logic beyond counting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tiers::RiskLevel;

// ============================================================================
// SINGLE PREDICTION
// ============================================================================

/// Risk assessment for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub student_id: String,
    /// Dropout probability (0.0 - 1.0)
    pub risk_score: f32,
    pub risk_level: RiskLevel,
    /// Voter agreement (0.0 - 1.0)
    pub confidence: f32,
    pub contributing_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub prediction_timestamp: DateTime<Utc>,
}

// ============================================================================
// BATCH
// ============================================================================

/// Why one batch slot has no prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    /// Position in the input (0-based)
    pub index: usize,
    pub student_id: String,
    pub error: String,
    pub code: String,
}

/// One slot of a batch, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Prediction(PredictionResult),
    Failed(ItemError),
}

impl BatchItem {
    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            BatchItem::Prediction(p) => Some(p),
            BatchItem::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ItemError> {
        match self {
            BatchItem::Prediction(_) => None,
            BatchItem::Failed(e) => Some(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.prediction().is_some()
    }
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let mut summary = Self {
            total: items.len(),
            ..Default::default()
        };

        for item in items {
            match item {
                BatchItem::Prediction(p) => {
                    summary.succeeded += 1;
                    match p.risk_level {
                        RiskLevel::High => summary.high += 1,
                        RiskLevel::Medium => summary.medium += 1,
                        RiskLevel::Low => summary.low += 1,
                    }
                }
                BatchItem::Failed(_) => summary.failed += 1,
            }
        }

        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
    pub processed_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn new(items: Vec<BatchItem>) -> Self {
        let summary = BatchSummary::from_items(&items);
        Self {
            items,
            summary,
            processed_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn predictions(&self) -> impl Iterator<Item = &PredictionResult> {
        self.items.iter().filter_map(BatchItem::prediction)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ItemError> {
        self.items.iter().filter_map(BatchItem::error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(level: RiskLevel) -> BatchItem {
        BatchItem::Prediction(PredictionResult {
            student_id: "s".into(),
            risk_score: 0.5,
            risk_level: level,
            confidence: 0.9,
            contributing_factors: vec![],
            recommendations: vec![],
            prediction_timestamp: Utc::now(),
        })
    }

    fn failure(index: usize) -> BatchItem {
        BatchItem::Failed(ItemError {
            index,
            student_id: format!("student_{}", index + 1),
            error: "Missing required field: total_credits".into(),
            code: "MISSING_FIELDS".into(),
        })
    }

    #[test]
    fn test_summary_counts() {
        let items = vec![
            prediction(RiskLevel::High),
            failure(1),
            prediction(RiskLevel::Low),
            prediction(RiskLevel::Low),
        ];
        let summary = BatchSummary::from_items(&items);

        assert_eq!(
            summary,
            BatchSummary { total: 4, succeeded: 3, failed: 1, high: 1, medium: 0, low: 2 }
        );
    }

    #[test]
    fn test_untagged_items_serialize_flat() {
        let ok = serde_json::to_value(prediction(RiskLevel::Medium)).unwrap();
        assert_eq!(ok["risk_level"], "MEDIUM");

        let err = serde_json::to_value(failure(0)).unwrap();
        assert_eq!(err["code"], "MISSING_FIELDS");
        assert_eq!(err["student_id"], "student_1");
        assert!(err.get("risk_score").is_none());
    }

    #[test]
    fn test_accessors() {
        let result = BatchResult::new(vec![failure(0), prediction(RiskLevel::High)]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.predictions().count(), 1);
        assert_eq!(result.errors().next().unwrap().index, 0);
        assert!(!result.items[0].is_ok());
    }
}
