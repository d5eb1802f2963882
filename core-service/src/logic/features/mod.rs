//! Features Module - Feature Engineering
//!
//! Raw student record → versioned 15-feature vector. The same derivation
//! feeds both the classifier and the explanation rules.

pub mod engineer;
pub mod layout;
pub mod record;
pub mod vector;


pub use engineer::{vectorize, Derivation, FeatureEngineer};
pub use layout::{
    feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use record::{RecordDefaults, ResolvedRecord, StudentRecord};
pub use vector::FeatureVector;
