//! Built-in explanation rules
//!
//! Feature rules first (most actionable first), tier rules last.

use crate::logic::features::layout::{RISK_ATTENDANCE_BELOW, RISK_CREDITS_ABOVE, RISK_GPA_BELOW};
use crate::logic::prediction::RiskLevel;

use super::types::{Condition, ExplanationRule, RuleTable, ValueFormat};

/// GPA trend below this is a decline
pub const DECLINE_TREND_BELOW: f32 = -0.1;

/// Fewer credits than this is a part-time load
pub const PART_TIME_CREDITS_BELOW: f32 = 12.0;

/// Attempted / completed above this means many unfinished courses
pub const UNFINISHED_RATIO_ABOVE: f32 = 1.25;

/// gpa / (difficulty + 0.1) below this is struggling relative to course load
pub const DIFFICULTY_STRAIN_BELOW: f32 = 0.6;

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: vec![
                feature_rule(
                    "low_gpa",
                    Condition::Below { feature: "current_gpa".into(), value: RISK_GPA_BELOW },
                    "Low GPA ({value})",
                    ValueFormat::Decimal,
                    &["Arrange tutoring for core courses"],
                ),
                feature_rule(
                    "poor_attendance",
                    Condition::Below { feature: "attendance_rate".into(), value: RISK_ATTENDANCE_BELOW },
                    "Poor attendance ({value})",
                    ValueFormat::Percent,
                    &["Monitor attendance closely"],
                ),
                feature_rule(
                    "declining_trend",
                    Condition::Below { feature: "gpa_trend".into(), value: DECLINE_TREND_BELOW },
                    "Declining academic performance",
                    ValueFormat::Decimal,
                    &["Review recent course performance with instructors"],
                ),
                feature_rule(
                    "heavy_load",
                    Condition::Above { feature: "total_credits".into(), value: RISK_CREDITS_ABOVE },
                    "Heavy course load ({value} credits)",
                    ValueFormat::Integer,
                    &["Consider course load reduction"],
                ),
                feature_rule(
                    "part_time_load",
                    Condition::Below { feature: "total_credits".into(), value: PART_TIME_CREDITS_BELOW },
                    "Part-time course load ({value} credits)",
                    ValueFormat::Integer,
                    &["Review enrollment plan with an advisor"],
                ),
                feature_rule(
                    "unfinished_credits",
                    Condition::Above { feature: "credit_load_ratio".into(), value: UNFINISHED_RATIO_ABOVE },
                    "Many attempted credits not completed (ratio {value})",
                    ValueFormat::Decimal,
                    &["Review withdrawn or failed courses with an advisor"],
                ),
                feature_rule(
                    "difficulty_strain",
                    Condition::Below { feature: "gpa_difficulty_interaction".into(), value: DIFFICULTY_STRAIN_BELOW },
                    "Struggling relative to course difficulty",
                    ValueFormat::Decimal,
                    &["Balance schedule with lower-difficulty courses"],
                ),
                feature_rule(
                    "first_generation",
                    Condition::AtLeast { feature: "is_first_generation".into(), value: 0.5 },
                    "First-generation college student",
                    ValueFormat::Integer,
                    &["Connect with first-generation student mentoring"],
                ),
                tier_rule(
                    "high_risk_intervention",
                    Condition::TierAtLeast { tier: RiskLevel::High },
                    &["Schedule immediate academic advisor meeting", "Enroll in academic support program"],
                ),
                tier_rule(
                    "elevated_risk_follow_up",
                    Condition::TierAtLeast { tier: RiskLevel::Medium },
                    &["Schedule regular check-ins", "Provide study skills resources"],
                ),
                tier_rule(
                    "routine_monitoring",
                    Condition::TierIs { tier: RiskLevel::Low },
                    &["Continue regular monitoring", "Maintain current support level"],
                ),
            ],
            max_factors: None,
        }
    }
}

fn feature_rule(
    id: &str,
    condition: Condition,
    factor: &str,
    format: ValueFormat,
    recommendations: &[&str],
) -> ExplanationRule {
    ExplanationRule {
        id: id.to_string(),
        condition,
        factor: Some(factor.to_string()),
        format,
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}

fn tier_rule(id: &str, condition: Condition, recommendations: &[&str]) -> ExplanationRule {
    ExplanationRule {
        id: id.to_string(),
        condition,
        factor: None,
        format: ValueFormat::default(),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = RuleTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.len(), 11);
        assert_eq!(table.rules[0].id, "low_gpa");
    }

    #[test]
    fn test_tier_rules_come_last() {
        let table = RuleTable::default();
        let first_tier = table
            .rules
            .iter()
            .position(|r| r.condition.feature().is_none())
            .unwrap();
        assert!(table.rules[first_tier..].iter().all(|r| r.condition.feature().is_none()));
    }

    #[test]
    fn test_default_table_survives_json() {
        let json = serde_json::to_string(&RuleTable::default()).unwrap();
        assert_eq!(RuleTable::from_json(&json).unwrap(), RuleTable::default());
    }
}
