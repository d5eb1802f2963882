//! Explanation Module
//!
//! Rule-based contributing factors and recommendations. Independent of the
//! classifier's internals: rules read the derived feature vector and, for
//! tier rules, the risk level.

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::ExplanationEngine;
pub use types::{Condition, Explanation, ExplanationRule, RuleTable, ValueFormat};
