//! Logic Module - Inference pipeline
//!
//! - `features/` - record → 15-dim feature vector
//! - `model/` - tree ensemble, artifact loading, classifier seam
//! - `explain/` - rule-based factors and recommendations
//! - `prediction/` - single and batch orchestration, risk tiers
//! - `synthetic` - seeded demo cohorts

pub mod explain;
pub mod features;
pub mod model;
pub mod prediction;
pub mod synthetic;
