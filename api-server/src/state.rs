//! Shared application state and startup wiring

use std::sync::Arc;

use anyhow::Context;
use retention_core::{ForestClassifier, ModelSlot, PredictionService, RuleTable, ServiceConfig};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService<ForestClassifier>>,
    pub slot: Arc<ModelSlot>,
    pub config: Config,
}

impl AppState {
    /// Load model, rules and service settings named by `config`
    ///
    /// A model that fails to load leaves the slot empty: the server still
    /// starts and prediction endpoints answer 503 until it is fixed.
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let slot = Arc::new(ModelSlot::empty());

        match &config.model_path {
            Some(path) => {
                if let Err(e) = slot.load_from_file(path, config.model_sha256.as_deref()) {
                    tracing::error!("Model load failed, predictions unavailable: {}", e);
                }
            }
            None => {
                tracing::warn!("MODEL_PATH not set, serving the built-in reference forest");
                slot.install(retention_core::TreeEnsemble::reference())?;
            }
        }

        let mut service_config = match &config.service_config_path {
            Some(path) => ServiceConfig::from_json_file(path)
                .with_context(|| format!("loading service config {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        if let Some(max) = config.max_batch_size {
            service_config.max_batch_size = max;
        }

        let rules = match &config.rules_path {
            Some(path) => RuleTable::from_json_file(path)
                .with_context(|| format!("loading rule table {}", path.display()))?,
            None => RuleTable::default(),
        };

        Self::with_parts(Arc::clone(&slot), &service_config, rules, config)
    }

    /// State over an existing slot
    pub fn with_parts(
        slot: Arc<ModelSlot>,
        service_config: &ServiceConfig,
        rules: RuleTable,
        config: Config,
    ) -> anyhow::Result<Self> {
        let rule_count = rules.len();
        let classifier = ForestClassifier::new(Arc::clone(&slot));
        let service = PredictionService::from_config(classifier, service_config, rules)?;

        tracing::info!(
            "Prediction service ready: {} rules, max batch {}, tiers {:?}",
            rule_count,
            service.max_batch_size(),
            service.tiers()
        );

        Ok(Self {
            service: Arc::new(service),
            slot,
            config,
        })
    }
}
