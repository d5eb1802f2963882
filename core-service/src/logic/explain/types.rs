//! Explanation rule types
//!
//! A rule table is plain data: an ordered list of conditions over named
//! layout features (or the risk tier), each with a factor template and the
//! recommendations it contributes.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::logic::features::{feature_index, FeatureVector};
use crate::logic::prediction::RiskLevel;

// ============================================================================
// CONDITIONS
// ============================================================================

/// Trigger of a single rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// feature < value
    Below { feature: String, value: f32 },
    /// feature > value
    Above { feature: String, value: f32 },
    /// feature >= value
    AtLeast { feature: String, value: f32 },
    /// feature <= value
    AtMost { feature: String, value: f32 },
    /// feature < low or feature > high
    Outside { feature: String, low: f32, high: f32 },
    /// Risk tier is `tier` or more severe
    TierAtLeast { tier: RiskLevel },
    /// Risk tier is exactly `tier`
    TierIs { tier: RiskLevel },
}

impl Condition {
    /// Feature the condition reads, if any
    pub fn feature(&self) -> Option<&str> {
        match self {
            Condition::Below { feature, .. }
            | Condition::Above { feature, .. }
            | Condition::AtLeast { feature, .. }
            | Condition::AtMost { feature, .. }
            | Condition::Outside { feature, .. } => Some(feature),
            Condition::TierAtLeast { .. } | Condition::TierIs { .. } => None,
        }
    }

    /// Whether the condition holds; unknown features never fire
    pub fn holds(&self, vector: &FeatureVector, level: RiskLevel) -> bool {
        let read = |name: &str| vector.get_by_name(name);
        match self {
            Condition::Below { feature, value } => read(feature).is_some_and(|v| v < *value),
            Condition::Above { feature, value } => read(feature).is_some_and(|v| v > *value),
            Condition::AtLeast { feature, value } => read(feature).is_some_and(|v| v >= *value),
            Condition::AtMost { feature, value } => read(feature).is_some_and(|v| v <= *value),
            Condition::Outside { feature, low, high } => {
                read(feature).is_some_and(|v| v < *low || v > *high)
            }
            Condition::TierAtLeast { tier } => level >= *tier,
            Condition::TierIs { tier } => level == *tier,
        }
    }

    fn bounds(&self) -> Vec<f32> {
        match self {
            Condition::Below { value, .. }
            | Condition::Above { value, .. }
            | Condition::AtLeast { value, .. }
            | Condition::AtMost { value, .. } => vec![*value],
            Condition::Outside { low, high, .. } => vec![*low, *high],
            Condition::TierAtLeast { .. } | Condition::TierIs { .. } => Vec::new(),
        }
    }
}

// ============================================================================
// FACTOR FORMATTING
// ============================================================================

/// How `{value}` renders inside a factor template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// 2.10
    #[default]
    Decimal,
    /// 65.0%
    Percent,
    /// 19
    Integer,
}

impl ValueFormat {
    pub fn render(&self, value: f32) -> String {
        match self {
            ValueFormat::Decimal => format!("{:.2}", value),
            ValueFormat::Percent => format!("{:.1}%", value * 100.0),
            ValueFormat::Integer => format!("{}", value.round() as i64),
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRule {
    pub id: String,
    pub condition: Condition,
    /// Factor text; `{value}` is replaced by the feature value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<String>,
    #[serde(default)]
    pub format: ValueFormat,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ExplanationRule {
    /// Render the factor text against the triggering vector
    pub fn render_factor(&self, vector: &FeatureVector) -> Option<String> {
        let template = self.factor.as_deref()?;
        if !template.contains("{value}") {
            return Some(template.to_string());
        }
        let value = self
            .condition
            .feature()
            .and_then(|name| vector.get_by_name(name))
            .unwrap_or_default();
        Some(template.replace("{value}", &self.format.render(value)))
    }

    fn invalid(&self, reason: impl Into<String>) -> RuleError {
        RuleError::InvalidRule {
            rule: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), RuleError> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("empty rule id"));
        }

        if let Some(feature) = self.condition.feature() {
            if feature_index(feature).is_none() {
                return Err(RuleError::UnknownFeature {
                    rule: self.id.clone(),
                    feature: feature.to_string(),
                });
            }
        }

        if self.condition.bounds().iter().any(|b| !b.is_finite()) {
            return Err(self.invalid("threshold is not finite"));
        }

        if let Condition::Outside { low, high, .. } = self.condition {
            if low > high {
                return Err(self.invalid(format!("low {} above high {}", low, high)));
            }
        }

        if self.factor.is_none() && self.recommendations.is_empty() {
            return Err(self.invalid("rule has neither a factor nor recommendations"));
        }

        if self.condition.feature().is_none()
            && self.factor.as_deref().is_some_and(|f| f.contains("{value}"))
        {
            return Err(self.invalid("tier rules cannot render {value}"));
        }

        Ok(())
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// Ordered decision list; earlier rules take priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<ExplanationRule>,
    /// Keep at most this many factors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_factors: Option<usize>,
}

impl RuleTable {
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let table: RuleTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RuleError> {
        let json = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded {} explanation rules from {}", table.rules.len(), path.display());
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(rule.invalid("duplicate rule id"));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Output of the explanation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Explanation {
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty() && self.recommendations.is_empty()
    }
}
