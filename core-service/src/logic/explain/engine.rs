use std::collections::HashSet;

use crate::error::RuleError;
use crate::logic::features::{FeatureVector, ResolvedRecord};
use crate::logic::prediction::{RiskLevel, TierThresholds};

use super::types::{Explanation, RuleTable};

/// Deterministic rule layer that turns a derived vector (and tier) into
/// contributing factors and recommendations
#[derive(Debug, Clone)]
pub struct ExplanationEngine {
    table: RuleTable,
    tiers: TierThresholds,
}

impl Default for ExplanationEngine {
    fn default() -> Self {
        Self {
            table: RuleTable::default(),
            tiers: TierThresholds::default(),
        }
    }
}

impl ExplanationEngine {
    pub fn new(table: RuleTable, tiers: TierThresholds) -> Result<Self, RuleError> {
        table.validate()?;
        Ok(Self { table, tiers })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Explain a scored record; `probability` only selects the tier
    pub fn explain(&self, record: &ResolvedRecord, vector: &FeatureVector, probability: f32) -> Explanation {
        self.explain_at(record, vector, self.tiers.classify(probability))
    }

    /// Explain against an already-classified tier
    pub fn explain_at(&self, record: &ResolvedRecord, vector: &FeatureVector, level: RiskLevel) -> Explanation {
        let mut explanation = Explanation::default();
        let mut seen = HashSet::new();

        for rule in &self.table.rules {
            if !rule.condition.holds(vector, level) {
                continue;
            }

            if let Some(factor) = rule.render_factor(vector) {
                explanation.factors.push(factor);
            }

            for recommendation in &rule.recommendations {
                if seen.insert(recommendation.as_str()) {
                    explanation.recommendations.push(recommendation.clone());
                }
            }
        }

        if let Some(max) = self.table.max_factors {
            explanation.factors.truncate(max);
        }

        log::debug!(
            "Explained {} ({}): {} factors, {} recommendations",
            record.student_id,
            level,
            explanation.factors.len(),
            explanation.recommendations.len()
        );

        explanation
    }
}
