//! Reference Ensemble
//!
//! Deterministic 100-tree forest used when no trained artifact is
//! configured. Not trained: thresholds are staggered across the healthy
//! ranges so the vote degrades smoothly. Every tree is non-increasing in
//! GPA and attendance.

use crate::logic::features::{feature_index, layout_hash, FEATURE_VERSION};

use super::ensemble::{DecisionTree, Node, TreeEnsemble};

pub const REFERENCE_MODEL_NAME: &str = "reference-forest-v1";

const GPA_CUTS: usize = 10;
const ATTENDANCE_CUTS: usize = 8;
const SIGNAL_TREES: usize = 5;

impl TreeEnsemble {
    /// Built-in demonstration forest
    pub fn reference() -> Self {
        let mut trees = Vec::with_capacity(GPA_CUTS * ATTENDANCE_CUTS + 4 * SIGNAL_TREES);

        for m in 0..ATTENDANCE_CUTS {
            for j in 0..GPA_CUTS {
                let gpa_cut = 1.6 + 0.2 * j as f32;
                let attendance_cut = 0.55 + 0.05 * m as f32;
                trees.push(academic_tree(gpa_cut, attendance_cut));
            }
        }

        for i in 0..SIGNAL_TREES {
            let step = i as f32;
            trees.push(stump("gpa_trend", -0.1 - 0.05 * step, 0.85, 0.10));
            trees.push(risk_count_tree(0.02 * step));
            trees.push(stump("credit_load_ratio", 1.2 + 0.05 * step, 0.10, 0.60));
            trees.push(stump("is_first_generation", 0.5, 0.10, 0.35));
        }

        Self {
            name: REFERENCE_MODEL_NAME.to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            trees,
        }
    }
}

fn index_of(name: &str) -> usize {
    // names below are compile-time layout members
    feature_index(name).unwrap_or_default()
}

/// GPA split, then attendance split on both sides
fn academic_tree(gpa_cut: f32, attendance_cut: f32) -> DecisionTree {
    let gpa = index_of("current_gpa");
    let attendance = index_of("attendance_rate");

    DecisionTree::new(vec![
        Node::Split { feature: gpa, threshold: gpa_cut, left: 1, right: 2 },
        Node::Split { feature: attendance, threshold: attendance_cut, left: 3, right: 4 },
        Node::Split { feature: attendance, threshold: attendance_cut, left: 5, right: 6 },
        Node::Leaf { value: 0.95 },
        Node::Leaf { value: 0.70 },
        Node::Leaf { value: 0.45 },
        Node::Leaf { value: 0.05 },
    ])
}

/// Zero, one, or two-plus hard risk indicators
fn risk_count_tree(shift: f32) -> DecisionTree {
    let count = index_of("risk_factor_count");

    DecisionTree::new(vec![
        Node::Split { feature: count, threshold: 0.5, left: 1, right: 2 },
        Node::Leaf { value: 0.05 },
        Node::Split { feature: count, threshold: 1.5, left: 3, right: 4 },
        Node::Leaf { value: 0.50 + shift },
        Node::Leaf { value: 0.90 + shift },
    ])
}

fn stump(feature: &str, threshold: f32, at_or_below: f32, above: f32) -> DecisionTree {
    DecisionTree::new(vec![
        Node::Split { feature: index_of(feature), threshold, left: 1, right: 2 },
        Node::Leaf { value: at_or_below },
        Node::Leaf { value: above },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FeatureEngineer, StudentRecord};

    fn score(record: &StudentRecord) -> f32 {
        let vector = FeatureEngineer::default().derive(record).unwrap();
        TreeEnsemble::reference().score(&vector).probability
    }

    #[test]
    fn test_reference_is_valid() {
        let model = TreeEnsemble::reference();
        assert!(model.validate().is_ok());
        assert_eq!(model.n_trees(), 100);
        assert_eq!(model.max_depth(), 3);
    }

    #[test]
    fn test_reference_split_features() {
        let mut features: Vec<usize> = TreeEnsemble::reference()
            .trees
            .iter()
            .flat_map(|tree| tree.nodes.iter())
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .collect();
        features.sort_unstable();
        features.dedup();

        assert_eq!(features, vec![0, 1, 3, 11, 12, 14]);
    }

    #[test]
    fn test_strong_student_scores_low() {
        let p = score(&StudentRecord::new(3.7, 0.95, 16));
        assert!(p < 0.1, "got {}", p);
    }

    #[test]
    fn test_struggling_student_scores_elevated() {
        let p = score(&StudentRecord::new(2.1, 0.60, 12));
        assert!(p >= 0.4, "got {}", p);

        let worse = score(&StudentRecord { gpa_trend: Some(-0.5), ..StudentRecord::new(1.2, 0.5, 12) });
        assert!(worse >= 0.7, "got {}", worse);
    }

    #[test]
    fn test_gpa_sweep_is_monotone() {
        let mut previous = 0.0;
        for step in (0..=40).rev() {
            let gpa = step as f32 / 10.0;
            let p = score(&StudentRecord::new(gpa, 0.8, 15));
            assert!(p >= previous, "gpa {} scored {} after {}", gpa, p, previous);
            previous = p;
        }
    }
}
