//! Risk Classifier
//!
//! The pipeline only sees this trait, so the service and the explanation
//! rules can be exercised with a stub that returns fixed scores.

use std::sync::Arc;
use std::time::Instant;

use crate::error::ModelUnavailable;
use crate::logic::features::FeatureVector;

use super::ensemble::EnsembleScore;
use super::slot::ModelSlot;

/// Dropout probability and voter agreement, both in [0, 1]
pub type RiskScore = EnsembleScore;

pub trait RiskClassifier: Send + Sync {
    /// Score one feature vector
    fn score(&self, vector: &FeatureVector) -> Result<RiskScore, ModelUnavailable>;

    /// Whether `score` can currently succeed
    fn is_ready(&self) -> bool {
        true
    }
}

impl<C: RiskClassifier + ?Sized> RiskClassifier for Arc<C> {
    fn score(&self, vector: &FeatureVector) -> Result<RiskScore, ModelUnavailable> {
        (**self).score(vector)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

// ============================================================================
// FOREST CLASSIFIER
// ============================================================================

/// Scores with whatever ensemble the slot currently holds
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    slot: Arc<ModelSlot>,
}

impl ForestClassifier {
    pub fn new(slot: Arc<ModelSlot>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &Arc<ModelSlot> {
        &self.slot
    }
}

impl RiskClassifier for ForestClassifier {
    fn score(&self, vector: &FeatureVector) -> Result<RiskScore, ModelUnavailable> {
        let started = Instant::now();
        let ensemble = self.slot.current()?;
        let score = ensemble.score(vector);
        self.slot.record_inference(started.elapsed().as_micros() as u64);
        Ok(score)
    }

    fn is_ready(&self) -> bool {
        self.slot.is_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FeatureEngineer, StudentRecord};

    #[test]
    fn test_forest_classifier_scores_in_range() {
        let classifier = ForestClassifier::new(Arc::new(ModelSlot::with_reference()));
        let vector = FeatureEngineer::default()
            .derive(&StudentRecord::new(2.4, 0.72, 14))
            .unwrap();

        let score = classifier.score(&vector).unwrap();
        assert!((0.0..=1.0).contains(&score.probability));
        assert!((0.0..=1.0).contains(&score.confidence));
        assert_eq!(classifier.slot().status().inference_count, 1);
    }

    #[test]
    fn test_forest_classifier_without_model() {
        let classifier = ForestClassifier::new(Arc::new(ModelSlot::empty()));
        assert!(!classifier.is_ready());
        assert_eq!(classifier.score(&FeatureVector::new()), Err(ModelUnavailable));
    }

    #[test]
    fn test_shared_classifier_through_arc() {
        let classifier: Arc<dyn RiskClassifier> =
            Arc::new(ForestClassifier::new(Arc::new(ModelSlot::with_reference())));
        assert!(classifier.is_ready());
        assert!(classifier.score(&FeatureVector::new()).is_ok());
    }
}
