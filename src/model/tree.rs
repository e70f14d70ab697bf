//! Regression trees and the two tree-ensemble scorers built from them.

use serde::{Deserialize, Serialize};

use super::{ModelKind, Scorer};
use crate::error::DataError;

/// One node of a regression tree, stored in a flat arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Goes `left` when `values[feature] < threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// A regression tree whose root is node 0.
///
/// Children always sit at higher indices than their parent, so traversal
/// terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// # Errors
    ///
    /// `MalformedModel` when the arena is empty, a child index does not point
    /// forward, or a split references a feature index `>= n_features`.
    pub fn new(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self, DataError> {
        let tree = Self { nodes };
        tree.validate(n_features)?;
        Ok(tree)
    }

    /// A single-leaf tree.
    pub fn constant(value: f64) -> Self {
        Self {
            nodes: vec![TreeNode::Leaf { value }],
        }
    }

    pub fn validate(&self, n_features: usize) -> Result<(), DataError> {
        if self.nodes.is_empty() {
            return Err(DataError::MalformedModel("tree has no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(DataError::MalformedModel(format!(
                        "node {i} splits on feature {feature}, model has {n_features}"
                    )));
                }
                for child in [left, right] {
                    if *child <= i || *child >= self.nodes.len() {
                        return Err(DataError::MalformedModel(format!(
                            "node {i} has invalid child {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, values: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if values[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Bagged trees; the prediction is the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    feature_names: Vec<String>,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(feature_names: Vec<String>, trees: Vec<RegressionTree>) -> Result<Self, DataError> {
        let forest = Self {
            feature_names,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.trees.is_empty() {
            return Err(DataError::MalformedModel("forest has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.feature_names.len())?;
        }
        Ok(())
    }
}

impl Scorer for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::Forest
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn score(&self, values: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(values)).sum();
        sum / self.trees.len() as f64
    }
}

/// Gradient-boosted trees: `base_score + Σ tree(x)`.
///
/// Leaf values are stored with the learning rate already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTrees {
    feature_names: Vec<String>,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedTrees {
    pub fn new(
        feature_names: Vec<String>,
        base_score: f64,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, DataError> {
        let model = Self {
            feature_names,
            base_score,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        for tree in &self.trees {
            tree.validate(self.feature_names.len())?;
        }
        Ok(())
    }
}

impl Scorer for BoostedTrees {
    fn kind(&self) -> ModelKind {
        ModelKind::Boosted
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn score(&self, values: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, t| acc + t.predict(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree::new(
            vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
            1,
        )
        .expect("valid stump")
    }

    #[test]
    fn split_goes_left_below_threshold() {
        let tree = stump(10.0, 1.0, 2.0);
        assert_eq!(tree.predict(&[9.9]), 1.0);
        assert_eq!(tree.predict(&[10.0]), 2.0);
    }

    #[test]
    fn rejects_backward_child() {
        let nodes = vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 1,
            },
            TreeNode::Leaf { value: 0.0 },
        ];
        assert!(RegressionTree::new(nodes, 1).is_err());
    }

    #[test]
    fn rejects_unknown_feature_index() {
        let nodes = vec![
            TreeNode::Split {
                feature: 3,
                threshold: 0.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 0.0 },
            TreeNode::Leaf { value: 1.0 },
        ];
        assert!(RegressionTree::new(nodes, 1).is_err());
    }

    #[test]
    fn forest_averages_trees() {
        let forest = RandomForest::new(
            vec!["x".into()],
            vec![stump(5.0, 1.0, 3.0), RegressionTree::constant(5.0)],
        )
        .expect("valid forest");
        assert_eq!(forest.score(&[0.0]), 3.0);
        assert_eq!(forest.score(&[6.0]), 4.0);
    }

    #[test]
    fn boosted_sums_onto_base_score() {
        let model = BoostedTrees::new(
            vec!["x".into()],
            10.0,
            vec![stump(5.0, -1.0, 1.0), stump(8.0, 0.5, 2.0)],
        )
        .expect("valid model");
        assert_eq!(model.score(&[0.0]), 9.5);
        assert_eq!(model.score(&[9.0]), 13.0);
    }

    #[test]
    fn node_json_is_tagged() {
        let json = r#"[{"type":"split","feature":0,"threshold":1.5,"left":1,"right":2},
                       {"type":"leaf","value":-1.0},{"type":"leaf","value":1.0}]"#;
        let nodes: Vec<TreeNode> = serde_json::from_str(json).expect("valid json");
        let tree = RegressionTree::new(nodes, 1).expect("valid tree");
        assert_eq!(tree.predict(&[2.0]), 1.0);
    }
}
