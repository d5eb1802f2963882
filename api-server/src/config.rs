//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Trained forest artifact; the built-in reference forest is served when unset
    pub model_path: Option<PathBuf>,

    /// Expected hex SHA-256 of the artifact
    pub model_sha256: Option<String>,

    /// Explanation rule table (JSON)
    pub rules_path: Option<PathBuf>,

    /// Prediction service settings (JSON)
    pub service_config_path: Option<PathBuf>,

    /// Overrides the service config's batch bound
    pub max_batch_size: Option<usize>,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),

            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),

            model_path: non_empty("MODEL_PATH").map(PathBuf::from),

            model_sha256: non_empty("MODEL_SHA256"),

            rules_path: non_empty("RULES_PATH").map(PathBuf::from),

            service_config_path: non_empty("SERVICE_CONFIG_PATH").map(PathBuf::from),

            max_batch_size: non_empty("MAX_BATCH_SIZE").and_then(|m| m.parse().ok()),

            log_json: non_empty("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),

            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.bind_address(), "127.0.0.1:5001");
        assert!(config.model_path.is_none());
        assert!(config.max_batch_size.is_none());
        assert!(!config.log_json);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("MODEL_PATH", "/models/forest.json"),
            ("MAX_BATCH_SIZE", "250"),
            ("LOG_FORMAT", "JSON"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.model_path, Some(PathBuf::from("/models/forest.json")));
        assert_eq!(config.max_batch_size, Some(250));
        assert!(config.log_json);
        assert!(config.is_production());
    }

    #[test]
    fn test_unparsable_and_blank_values_fall_back() {
        let config = config(&[("PORT", "http"), ("MODEL_PATH", "  "), ("MAX_BATCH_SIZE", "-3")]);
        assert_eq!(config.port, 5001);
        assert!(config.model_path.is_none());
        assert!(config.max_batch_size.is_none());
    }
}
