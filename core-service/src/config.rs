//! Service Configuration
//!
//! Tunables for the prediction service. Loaded from a JSON file or built in
//! code; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logic::features::RecordDefaults;
use crate::logic::prediction::{TierThresholds, DEFAULT_MAX_BATCH_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Larger batches are rejected outright
    pub max_batch_size: usize,
    /// Score batch items on the rayon pool
    pub parallel_batch: bool,
    pub tiers: TierThresholds,
    /// Values for absent optional record fields
    pub defaults: RecordDefaults,
    /// Overrides the rule table's factor cap when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_factors: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallel_batch: true,
            tiers: TierThresholds::default(),
            defaults: RecordDefaults::default(),
            max_factors: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded service config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tiers.validate()?;

        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid("max_batch_size must be at least 1".into()));
        }

        let d = &self.defaults;
        if !d.gpa_trend.is_finite() {
            return Err(ConfigError::Invalid("default gpa_trend must be finite".into()));
        }
        if !(1.0..=5.0).contains(&d.course_difficulty_avg) {
            return Err(ConfigError::Invalid(format!(
                "default course_difficulty_avg {} outside 1.0 - 5.0",
                d.course_difficulty_avg
            )));
        }
        if d.age == 0 {
            return Err(ConfigError::Invalid("default age must be positive".into()));
        }

        Ok(())
    }
}
