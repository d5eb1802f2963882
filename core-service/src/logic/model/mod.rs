//! Model Module - Ensemble inference
//!
//! - `ensemble`: immutable tree forest and its scoring
//! - `artifact`: JSON artifact parsing, checksum and validation
//! - `slot`: shared handle the startup code loads once
//! - `classifier`: the `RiskClassifier` seam used by the pipeline
//! - `reference`: built-in demonstration forest

pub mod artifact;
pub mod classifier;
pub mod ensemble;
pub mod reference;
pub mod slot;

pub use classifier::{ForestClassifier, RiskClassifier, RiskScore};
pub use ensemble::{DecisionTree, EnsembleScore, Node, TreeEnsemble};
pub use reference::REFERENCE_MODEL_NAME;
pub use slot::{EngineStatus, ModelMetadata, ModelSlot};
