//! Model Slot - the process-wide model handle
//!
//! Created once by the startup code and shared through `Arc`. The slot only
//! guards the pointer swap; scoring takes an `Arc` snapshot so a reload
//! never touches a model that is mid-inference.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelUnavailable};
use crate::logic::features::FEATURE_COUNT;

use super::artifact;
use super::ensemble::TreeEnsemble;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    /// File path, `<memory>` or `<builtin>`
    pub source: String,
    pub n_trees: usize,
    pub max_depth: usize,
    pub features: usize,
    pub sha256: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Engine status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub n_trees: usize,
    pub features: usize,
    pub avg_latency_us: f64,
    pub inference_count: u64,
}

struct Installed {
    ensemble: Arc<TreeEnsemble>,
    metadata: ModelMetadata,
}

// ============================================================================
// SLOT
// ============================================================================

#[derive(Default)]
pub struct ModelSlot {
    installed: RwLock<Option<Installed>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl ModelSlot {
    /// Empty slot; scoring fails with `ModelUnavailable` until a load
    pub fn empty() -> Self {
        Self::default()
    }

    /// Slot holding the built-in reference forest
    pub fn with_reference() -> Self {
        let slot = Self::empty();
        slot.store(TreeEnsemble::reference(), "<builtin>", None);
        slot
    }

    /// Load an artifact file, optionally checking its SHA-256
    pub fn load_from_file(&self, path: &Path, expected_sha256: Option<&str>) -> Result<(), ModelError> {
        log::info!("Loading model artifact from: {}", path.display());

        let ensemble = artifact::read_artifact(path, expected_sha256)?;
        self.store(ensemble, &path.display().to_string(), expected_sha256.map(str::to_lowercase));
        Ok(())
    }

    /// Load an artifact from memory
    pub fn load_from_bytes(&self, bytes: &[u8], expected_sha256: Option<&str>) -> Result<(), ModelError> {
        log::info!("Loading model artifact from memory ({} bytes)", bytes.len());

        let ensemble = artifact::parse_artifact(bytes, expected_sha256)?;
        self.store(ensemble, "<memory>", Some(artifact::checksum(bytes)));
        Ok(())
    }

    /// Install an ensemble built in-process
    pub fn install(&self, ensemble: TreeEnsemble) -> Result<(), ModelError> {
        ensemble.validate()?;
        self.store(ensemble, "<memory>", None);
        Ok(())
    }

    fn store(&self, ensemble: TreeEnsemble, source: &str, sha256: Option<String>) {
        let metadata = ModelMetadata {
            name: ensemble.name.clone(),
            source: source.to_string(),
            n_trees: ensemble.n_trees(),
            max_depth: ensemble.max_depth(),
            features: FEATURE_COUNT,
            sha256,
            loaded_at: Utc::now(),
        };

        log::info!(
            "Model '{}' installed: {} trees, max depth {}",
            metadata.name,
            metadata.n_trees,
            metadata.max_depth
        );

        *self.installed.write() = Some(Installed {
            ensemble: Arc::new(ensemble),
            metadata,
        });
    }

    pub fn unload(&self) {
        *self.installed.write() = None;
        log::info!("Model unloaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.installed.read().is_some()
    }

    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.installed.read().as_ref().map(|i| i.metadata.clone())
    }

    /// Snapshot of the current ensemble
    pub fn current(&self) -> Result<Arc<TreeEnsemble>, ModelUnavailable> {
        self.installed
            .read()
            .as_ref()
            .map(|i| Arc::clone(&i.ensemble))
            .ok_or(ModelUnavailable)
    }

    pub(crate) fn record_inference(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> EngineStatus {
        let guard = self.installed.read();
        let (loaded, name, n_trees) = match guard.as_ref() {
            Some(i) => (true, i.metadata.name.clone(), i.metadata.n_trees),
            None => (false, "None".to_string(), 0),
        };
        drop(guard);

        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { sum as f64 / count as f64 } else { 0.0 };

        EngineStatus {
            model_loaded: loaded,
            model_name: name,
            n_trees,
            features: FEATURE_COUNT,
            avg_latency_us: avg,
            inference_count: count,
        }
    }
}

impl std::fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSlot")
            .field("metadata", &self.metadata())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_is_unavailable() {
        let slot = ModelSlot::empty();
        assert!(!slot.is_loaded());
        assert_eq!(slot.current().unwrap_err(), ModelUnavailable);

        let status = slot.status();
        assert!(!status.model_loaded);
        assert_eq!(status.model_name, "None");
    }

    #[test]
    fn test_reference_slot() {
        let slot = ModelSlot::with_reference();
        let meta = slot.metadata().unwrap();
        assert_eq!(meta.source, "<builtin>");
        assert_eq!(meta.n_trees, 100);
        assert_eq!(slot.status().features, FEATURE_COUNT);
    }

    #[test]
    fn test_load_bytes_then_unload() {
        let slot = ModelSlot::empty();
        let bytes = serde_json::to_vec(&TreeEnsemble::reference()).unwrap();

        slot.load_from_bytes(&bytes, None).unwrap();
        assert!(slot.is_loaded());
        assert_eq!(slot.metadata().unwrap().sha256, Some(artifact::checksum(&bytes)));

        slot.unload();
        assert!(slot.current().is_err());
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let slot = ModelSlot::with_reference();
        assert!(slot.load_from_bytes(b"{}", None).is_err());
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_install_validates() {
        let slot = ModelSlot::empty();
        let mut broken = TreeEnsemble::reference();
        broken.trees.clear();
        assert!(matches!(slot.install(broken), Err(ModelError::Empty)));
        assert!(!slot.is_loaded());

        slot.install(TreeEnsemble::reference()).unwrap();
        assert_eq!(slot.metadata().unwrap().source, "<memory>");
    }

    #[test]
    fn test_snapshot_survives_unload() {
        let slot = ModelSlot::with_reference();
        let snapshot = slot.current().unwrap();
        slot.unload();
        assert_eq!(snapshot.n_trees(), 100);
    }

    #[test]
    fn test_latency_stats() {
        let slot = ModelSlot::with_reference();
        slot.record_inference(10);
        slot.record_inference(30);

        let status = slot.status();
        assert_eq!(status.inference_count, 2);
        assert!((status.avg_latency_us - 20.0).abs() < f64::EPSILON);
    }
}
