//! Risk Tiers
//!
//! Maps a dropout probability onto HIGH / MEDIUM / LOW. Each tier includes
//! its lower bound.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// At or above this score = HIGH
pub const HIGH_RISK_THRESHOLD: f32 = 0.7;

/// At or above this score (and below HIGH) = MEDIUM
pub const MEDIUM_RISK_THRESHOLD: f32 = 0.4;

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Discrete risk tier, ordered LOW < MEDIUM < HIGH
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Tier boundaries (configurable)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Lowest HIGH score
    pub high: f32,
    /// Lowest MEDIUM score
    pub medium: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: HIGH_RISK_THRESHOLD,
            medium: MEDIUM_RISK_THRESHOLD,
        }
    }
}

impl TierThresholds {
    /// Requires `0 <= medium < high <= 1`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.medium && self.medium < self.high && self.high <= 1.0;
        if !ordered {
            return Err(ConfigError::Invalid(format!(
                "tier thresholds must satisfy 0 <= medium < high <= 1 (medium = {}, high = {})",
                self.medium, self.high
            )));
        }
        Ok(())
    }

    pub fn classify(&self, score: f32) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
