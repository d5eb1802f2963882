//! Tree Ensemble - immutable, pre-trained decision forest
//!
//! Trees are stored as flat node arrays. Split nodes send a sample left
//! when `value <= threshold`. Leaves hold the positive-class ("at risk")
//! probability of that tree.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::logic::features::{validate_layout, FeatureVector, FEATURE_COUNT};

/// Deepest tree accepted from an artifact
pub const MAX_TREE_DEPTH: usize = 32;

// ============================================================================
// NODES & TREES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Positive-class probability for one sample
    ///
    /// `None` if the walk leaves the node array, splits on a feature outside
    /// the layout or never reaches a leaf. Validated trees always resolve.
    pub fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Option<f32> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index)? {
                Node::Leaf { value } => return Some(*value),
                Node::Split { feature, threshold, left, right } => {
                    index = if *features.get(*feature)? <= *threshold { *left } else { *right };
                }
            }
        }
        None
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        if let Some(first) = depths.first_mut() {
            *first = 1;
        }
        // children always come after their parent
        for (index, node) in self.nodes.iter().enumerate() {
            let depth = depths[index];
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = node {
                for child in [*left, *right] {
                    if let Some(d) = depths.get_mut(child) {
                        *d = (*d).max(depth + 1);
                    }
                }
            }
        }
        max_depth
    }

    fn validate(&self, tree: usize) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidTree { tree, reason };

        if self.nodes.is_empty() {
            return Err(invalid("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } => {
                    if !value.is_finite() || !(0.0..=1.0).contains(value) {
                        return Err(invalid(format!("leaf {} has probability {} outside [0, 1]", index, value)));
                    }
                }
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(invalid(format!("node {} splits on unknown feature {}", index, feature)));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} has a non-finite threshold", index)));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(invalid(format!("node {} has invalid child {}", index, child)));
                        }
                    }
                }
            }
        }

        let depth = self.depth();
        if depth > MAX_TREE_DEPTH {
            return Err(invalid(format!("depth {} exceeds {}", depth, MAX_TREE_DEPTH)));
        }

        Ok(())
    }
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// Probability plus agreement among the trees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleScore {
    pub probability: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub name: String,
    /// Feature layout the trees were trained against
    pub feature_version: u8,
    pub layout_hash: u32,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }

    /// Structural and layout checks, run once at load time
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_layout(self.feature_version, self.layout_hash)?;

        if self.trees.is_empty() {
            return Err(ModelError::Empty);
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index)?;
        }

        Ok(())
    }

    /// Mean tree probability; confidence = 1 - 2σ of the tree probabilities
    ///
    /// Trees that cannot resolve the sample (only possible before `validate`)
    /// don't vote. With no votes at all the score is an even split.
    pub fn score(&self, vector: &FeatureVector) -> EnsembleScore {
        let features = vector.as_array();

        let (count, sum, sum_sq) = self
            .trees
            .iter()
            .filter_map(|tree| tree.predict(features))
            .fold((0usize, 0.0f64, 0.0f64), |(count, sum, sum_sq), p| {
                let p = p as f64;
                (count + 1, sum + p, sum_sq + p * p)
            });

        if count == 0 {
            return EnsembleScore { probability: 0.5, confidence: 0.0 };
        }

        let n = count as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);

        EnsembleScore {
            probability: mean.clamp(0.0, 1.0) as f32,
            confidence: (1.0 - 2.0 * variance.sqrt()).clamp(0.0, 1.0) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{layout_hash, FEATURE_VERSION};

    fn stump(feature: usize, threshold: f32, low: f32, high: f32) -> DecisionTree {
        DecisionTree::new(vec![
            Node::Split { feature, threshold, left: 1, right: 2 },
            Node::Leaf { value: low },
            Node::Leaf { value: high },
        ])
    }

    fn ensemble(trees: Vec<DecisionTree>) -> TreeEnsemble {
        TreeEnsemble {
            name: "test".to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            trees,
        }
    }

    fn vector_with_gpa(gpa: f32) -> FeatureVector {
        let mut v = FeatureVector::new();
        v.set_by_name("current_gpa", gpa);
        v
    }

    #[test]
    fn test_tree_predict_goes_left_on_equal() {
        let tree = stump(0, 2.5, 0.9, 0.1);
        assert_eq!(tree.predict(vector_with_gpa(2.5).as_array()), Some(0.9));
        assert_eq!(tree.predict(vector_with_gpa(2.6).as_array()), Some(0.1));
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_unanimous_trees_full_confidence() {
        let model = ensemble(vec![stump(0, 2.5, 0.8, 0.2); 10]);
        let score = model.score(&vector_with_gpa(1.0));
        assert!((score.probability - 0.8).abs() < 1e-6);
        assert!((score.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_split_vote_zero_confidence() {
        let model = ensemble(vec![
            DecisionTree::new(vec![Node::Leaf { value: 1.0 }]),
            DecisionTree::new(vec![Node::Leaf { value: 0.0 }]),
        ]);
        let score = model.score(&FeatureVector::new());
        assert!((score.probability - 0.5).abs() < 1e-6);
        assert!(score.confidence.abs() < 1e-6);
    }

    #[test]
    fn test_unvalidated_trees_do_not_panic() {
        let dangling = DecisionTree::new(vec![Node::Split { feature: 0, threshold: 1.0, left: 7, right: 9 }]);
        let off_layout = stump(FEATURE_COUNT + 3, 1.0, 0.5, 0.2);
        let looping = DecisionTree::new(vec![
            Node::Split { feature: 0, threshold: 1.0, left: 0, right: 0 },
            Node::Leaf { value: 0.3 },
        ]);
        let v = vector_with_gpa(2.0);

        assert_eq!(dangling.predict(v.as_array()), None);
        assert_eq!(off_layout.predict(v.as_array()), None);
        assert_eq!(looping.predict(v.as_array()), None);
        assert_eq!(dangling.depth(), 1);
        assert_eq!(DecisionTree::new(vec![]).predict(v.as_array()), None);

        let broken = ensemble(vec![dangling, looping]);
        assert_eq!(broken.score(&v), EnsembleScore { probability: 0.5, confidence: 0.0 });

        let mixed = ensemble(vec![off_layout, stump(0, 2.5, 0.8, 0.2)]);
        let score = mixed.score(&v);
        assert!((score.probability - 0.8).abs() < 1e-6);
        assert!((score.confidence - 1.0).abs() < 1e-6);
        assert!(ensemble(vec![]).score(&v).probability == 0.5);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let model = ensemble(vec![stump(0, 2.5, 0.8, 0.2), stump(1, 0.7, 0.6, 0.1)]);
        assert!(model.validate().is_ok());
        assert_eq!(model.max_depth(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_trees() {
        assert!(matches!(ensemble(vec![]).validate(), Err(ModelError::Empty)));

        let bad_leaf = ensemble(vec![stump(0, 2.5, 1.5, 0.2)]);
        assert!(matches!(bad_leaf.validate(), Err(ModelError::InvalidTree { tree: 0, .. })));

        let bad_feature = ensemble(vec![stump(0, 2.5, 0.5, 0.2), stump(FEATURE_COUNT, 1.0, 0.5, 0.2)]);
        assert!(matches!(bad_feature.validate(), Err(ModelError::InvalidTree { tree: 1, .. })));

        let cycle = ensemble(vec![DecisionTree::new(vec![
            Node::Split { feature: 0, threshold: 1.0, left: 0, right: 1 },
            Node::Leaf { value: 0.5 },
        ])]);
        assert!(matches!(cycle.validate(), Err(ModelError::InvalidTree { .. })));

        let mut stale = ensemble(vec![stump(0, 2.5, 0.5, 0.2)]);
        stale.feature_version = FEATURE_VERSION + 1;
        assert!(matches!(stale.validate(), Err(ModelError::Layout(_))));
    }

    #[test]
    fn test_node_json_shape() {
        let json = serde_json::to_value(stump(3, -0.1, 0.7, 0.2)).unwrap();
        assert_eq!(json["nodes"][0]["split"]["feature"], 3);
        assert_eq!(json["nodes"][2]["leaf"]["value"].as_f64().map(|v| v as f32), Some(0.2));
    }
}
