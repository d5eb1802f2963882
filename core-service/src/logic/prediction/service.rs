//! Prediction Service
//!
//! Orchestrates record → features → score → tier → explanation, for one
//! student or a batch. Batch slots fail independently; only a missing
//! model aborts a whole batch.

use chrono::Utc;
use rayon::prelude::*;

use crate::config::ServiceConfig;
use crate::error::{ConfigError, ModelUnavailable, PredictionError, ValidationError};
use crate::logic::explain::{ExplanationEngine, RuleTable};
use crate::logic::features::{FeatureEngineer, StudentRecord};
use crate::logic::model::RiskClassifier;

use super::tiers::TierThresholds;
use super::types::{BatchItem, BatchResult, ItemError, PredictionResult};

/// Default upper bound on batch size
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

pub struct PredictionService<C> {
    engineer: FeatureEngineer,
    classifier: C,
    explainer: ExplanationEngine,
    tiers: TierThresholds,
    max_batch_size: usize,
    parallel_batch: bool,
}

impl<C: RiskClassifier> PredictionService<C> {
    /// Service with built-in defaults and rules
    pub fn new(classifier: C) -> Self {
        Self {
            engineer: FeatureEngineer::default(),
            classifier,
            explainer: ExplanationEngine::default(),
            tiers: TierThresholds::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallel_batch: true,
        }
    }

    /// Service configured from `config`, explaining with `rules`
    pub fn from_config(
        classifier: C,
        config: &ServiceConfig,
        mut rules: RuleTable,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.max_factors.is_some() {
            rules.max_factors = config.max_factors;
        }

        Ok(Self {
            engineer: FeatureEngineer::new(config.defaults.clone()),
            classifier,
            explainer: ExplanationEngine::new(rules, config.tiers)?,
            tiers: config.tiers,
            max_batch_size: config.max_batch_size,
            parallel_batch: config.parallel_batch,
        })
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    pub fn with_parallel_batch(mut self, parallel: bool) -> Self {
        self.parallel_batch = parallel;
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn tiers(&self) -> TierThresholds {
        self.tiers
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    // ========================================================================
    // SINGLE
    // ========================================================================

    pub fn predict_one(&self, record: &StudentRecord) -> Result<PredictionResult, PredictionError> {
        self.predict_as(record, &self.engineer.defaults().student_id)
    }

    fn predict_as(&self, record: &StudentRecord, fallback_id: &str) -> Result<PredictionResult, PredictionError> {
        let derivation = self.engineer.derive_detailed_as(record, fallback_id)?;
        let score = self.classifier.score(&derivation.vector)?;

        let risk_score = score.probability.clamp(0.0, 1.0);
        let confidence = score.confidence.clamp(0.0, 1.0);
        let risk_level = self.tiers.classify(risk_score);
        let explanation = self
            .explainer
            .explain_at(&derivation.record, &derivation.vector, risk_level);

        Ok(PredictionResult {
            student_id: derivation.record.student_id,
            risk_score,
            risk_level,
            confidence,
            contributing_factors: explanation.factors,
            recommendations: explanation.recommendations,
            prediction_timestamp: Utc::now(),
        })
    }

    // ========================================================================
    // BATCH
    // ========================================================================

    pub fn predict_many(&self, records: &[StudentRecord]) -> Result<BatchResult, PredictionError> {
        self.check_batch(records.len())?;
        let items = self.map_items(records, |index, record| self.batch_item(index, Ok(record), None))?;
        Ok(self.finish(items))
    }

    /// Batch over raw JSON values; malformed values fail their own slot
    pub fn predict_many_json(&self, values: &[serde_json::Value]) -> Result<BatchResult, PredictionError> {
        self.check_batch(values.len())?;
        let items = self.map_items(values, |index, value| match StudentRecord::from_json(value) {
            Ok(record) => self.batch_item(index, Ok(&record), None),
            Err(e) => self.batch_item(index, Err(e), StudentRecord::json_student_id(value)),
        })?;
        Ok(self.finish(items))
    }

    fn check_batch(&self, size: usize) -> Result<(), PredictionError> {
        if size > self.max_batch_size {
            log::warn!("Rejected batch of {} records (max {})", size, self.max_batch_size);
            return Err(PredictionError::BatchTooLarge {
                size,
                max: self.max_batch_size,
            });
        }
        if size > 0 && !self.classifier.is_ready() {
            return Err(ModelUnavailable.into());
        }
        Ok(())
    }

    fn map_items<T, F>(&self, inputs: &[T], evaluate: F) -> Result<Vec<BatchItem>, ModelUnavailable>
    where
        T: Sync,
        F: Fn(usize, &T) -> Result<BatchItem, ModelUnavailable> + Sync + Send,
    {
        if self.parallel_batch && inputs.len() > 1 {
            inputs
                .par_iter()
                .enumerate()
                .map(|(index, input)| evaluate(index, input))
                .collect()
        } else {
            inputs
                .iter()
                .enumerate()
                .map(|(index, input)| evaluate(index, input))
                .collect()
        }
    }

    fn batch_item(
        &self,
        index: usize,
        record: Result<&StudentRecord, ValidationError>,
        id_hint: Option<String>,
    ) -> Result<BatchItem, ModelUnavailable> {
        let fallback_id = format!("student_{}", index + 1);
        let known_id = match &record {
            Ok(r) => r.student_id.clone(),
            Err(_) => id_hint,
        };

        let outcome = record
            .map_err(PredictionError::from)
            .and_then(|r| self.predict_as(r, &fallback_id));

        match outcome {
            Ok(result) => Ok(BatchItem::Prediction(result)),
            Err(PredictionError::ModelUnavailable(e)) => Err(e),
            Err(err) => {
                let student_id = known_id.unwrap_or(fallback_id);
                log::debug!("Batch item {} ({}) failed: {}", index, student_id, err);
                Ok(BatchItem::Failed(ItemError {
                    index,
                    student_id,
                    error: err.to_string(),
                    code: err.code().to_string(),
                }))
            }
        }
    }

    fn finish(&self, items: Vec<BatchItem>) -> BatchResult {
        let result = BatchResult::new(items);
        let s = &result.summary;
        log::debug!(
            "Batch processed: {} total, {} ok, {} failed (high {}, medium {}, low {})",
            s.total,
            s.succeeded,
            s.failed,
            s.high,
            s.medium,
            s.low
        );
        result
    }
}

impl<C> std::fmt::Debug for PredictionService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("tiers", &self.tiers)
            .field("max_batch_size", &self.max_batch_size)
            .field("parallel_batch", &self.parallel_batch)
            .field("rules", &self.explainer.table().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::RecordDefaults;
    use crate::logic::model::{ForestClassifier, ModelSlot};
    use std::sync::Arc;

    fn classifier() -> ForestClassifier {
        ForestClassifier::new(Arc::new(ModelSlot::with_reference()))
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = ServiceConfig {
            max_batch_size: 10,
            parallel_batch: false,
            defaults: RecordDefaults { student_id: "anonymous".into(), ..Default::default() },
            max_factors: Some(1),
            ..Default::default()
        };
        let service = PredictionService::from_config(classifier(), &config, RuleTable::default()).unwrap();
        assert_eq!(service.max_batch_size(), 10);

        let result = service
            .predict_one(&StudentRecord { gpa_trend: Some(-0.5), ..StudentRecord::new(1.5, 0.5, 12) })
            .unwrap();
        assert_eq!(result.student_id, "anonymous");
        assert_eq!(result.contributing_factors, vec!["Low GPA (1.50)"]);
    }

    #[test]
    fn test_from_config_rejects_bad_tiers() {
        let config = ServiceConfig {
            tiers: TierThresholds { high: 0.2, medium: 0.5 },
            ..Default::default()
        };
        let err = PredictionService::from_config(classifier(), &config, RuleTable::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_readiness_follows_slot() {
        let slot = Arc::new(ModelSlot::empty());
        let service = PredictionService::new(ForestClassifier::new(Arc::clone(&slot)));
        assert!(!service.is_ready());

        slot.install(crate::logic::model::TreeEnsemble::reference()).unwrap();
        assert!(service.is_ready());
        assert!(service.predict_one(&StudentRecord::new(3.0, 0.9, 15)).is_ok());
    }
}
