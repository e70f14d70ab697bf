//! Trained scorers and the fixed-weight ensemble that blends them.

pub mod ensemble;
pub mod linear;
pub mod store;
pub mod tree;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use ensemble::{EnsemblePredictor, EnsembleWeights, Predictor};
pub use linear::LinearModel;
pub use store::{ModelArtifact, ModelStore};
pub use tree::{BoostedTrees, RandomForest, RegressionTree, TreeNode};

/// Quantity being forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Demand,
    Price,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Demand, Target::Price];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three model families blended by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Ridge-style linear regression.
    Linear,
    /// Bagged regression trees, averaged.
    Forest,
    /// Gradient-boosted regression trees, summed.
    Boosted,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Linear, ModelKind::Forest, ModelKind::Boosted];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Forest => "forest",
            Self::Boosted => "boosted",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trained regressor: accepts values in its trained feature order, returns a scalar.
///
/// Scorers are read-only during inference and may be shared across
/// concurrent per-city runs.
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Model family.
    fn kind(&self) -> ModelKind;

    /// Feature names in the order the model was trained with.
    fn feature_names(&self) -> &[String];

    /// Scores one row. `values` follows [`Scorer::feature_names`].
    fn score(&self, values: &[f64]) -> f64;
}
