//! JSON model artifacts on disk, one file per (kind, target, city).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    BoostedTrees, EnsemblePredictor, EnsembleWeights, LinearModel, ModelKind, RandomForest,
    Scorer, Target,
};
use crate::error::DataError;
use crate::features::SCHEMA_VERSION;

/// Serialized form of a trained scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        #[serde(default = "current_schema_version")]
        schema_version: u32,
        #[serde(flatten)]
        model: LinearModel,
    },
    Forest {
        #[serde(default = "current_schema_version")]
        schema_version: u32,
        #[serde(flatten)]
        model: RandomForest,
    },
    Boosted {
        #[serde(default = "current_schema_version")]
        schema_version: u32,
        #[serde(flatten)]
        model: BoostedTrees,
    },
}

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ModelArtifact {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Linear { .. } => ModelKind::Linear,
            Self::Forest { .. } => ModelKind::Forest,
            Self::Boosted { .. } => ModelKind::Boosted,
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            Self::Linear { schema_version, .. }
            | Self::Forest { schema_version, .. }
            | Self::Boosted { schema_version, .. } => *schema_version,
        }
    }

    /// Validates the artifact and turns it into a shareable scorer.
    ///
    /// # Errors
    ///
    /// `MalformedModel` for a schema version other than [`SCHEMA_VERSION`] or
    /// an internally inconsistent model.
    pub fn into_scorer(self) -> Result<Arc<dyn Scorer>, DataError> {
        let version = self.schema_version();
        if version != SCHEMA_VERSION {
            return Err(DataError::MalformedModel(format!(
                "{} artifact uses feature schema v{version}, expected v{SCHEMA_VERSION}",
                self.kind()
            )));
        }
        Ok(match self {
            Self::Linear { model, .. } => {
                model.validate()?;
                Arc::new(model)
            }
            Self::Forest { model, .. } => {
                model.validate()?;
                Arc::new(model)
            }
            Self::Boosted { model, .. } => {
                model.validate()?;
                Arc::new(model)
            }
        })
    }
}

/// Directory of model artifacts named `<kind>_<target>_<city>.json`.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ModelKind, target: Target, city: &str) -> PathBuf {
        self.dir.join(format!("{kind}_{target}_{city}.json"))
    }

    /// Reads one artifact; `Ok(None)` when the file does not exist.
    pub fn load(
        &self,
        kind: ModelKind,
        target: Target,
        city: &str,
    ) -> Result<Option<Arc<dyn Scorer>>, DataError> {
        let path = self.path_for(kind, target, city);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DataError::io(path, e)),
        };
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|source| DataError::Artifact {
                path: path.clone(),
                source,
            })?;
        if artifact.kind() != kind {
            return Err(DataError::MalformedModel(format!(
                "`{}` holds a {} model, expected {kind}",
                path.display(),
                artifact.kind()
            )));
        }
        debug!(path = %path.display(), %kind, %target, "loaded model artifact");
        artifact.into_scorer().map(Some)
    }

    /// Loads every available scorer for `city`.
    ///
    /// Missing files leave their slot empty; the predictor then reports
    /// `ModelNotLoaded` for that target.
    pub fn load_predictor(
        &self,
        city: &str,
        weights: EnsembleWeights,
    ) -> Result<EnsemblePredictor, DataError> {
        let mut predictor = EnsemblePredictor::new(weights);
        for target in Target::ALL {
            for kind in ModelKind::ALL {
                match self.load(kind, target, city)? {
                    Some(scorer) => predictor.insert(target, scorer),
                    None => warn!(
                        city,
                        path = %self.path_for(kind, target, city).display(),
                        "model artifact missing"
                    ),
                }
            }
        }
        Ok(predictor)
    }

    /// Writes `artifact` to its conventional path, creating the directory.
    pub fn save(&self, artifact: &ModelArtifact, target: Target, city: &str) -> Result<PathBuf, DataError> {
        fs::create_dir_all(&self.dir).map_err(|e| DataError::io(&self.dir, e))?;
        let path = self.path_for(artifact.kind(), target, city);
        let json = serde_json::to_string_pretty(artifact).map_err(|source| DataError::Artifact {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| DataError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RegressionTree, TreeNode};

    #[test]
    fn parses_linear_artifact() {
        let json = r#"{
            "kind": "linear",
            "feature_names": ["demand_lag1", "temp_C"],
            "intercept": 2.0,
            "coefficients": [1.0, -0.5]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).expect("valid artifact");
        assert_eq!(artifact.kind(), ModelKind::Linear);
        assert_eq!(artifact.schema_version(), SCHEMA_VERSION);
        let scorer = artifact.into_scorer().expect("consistent model");
        assert_eq!(scorer.score(&[10.0, 4.0]), 10.0);
    }

    #[test]
    fn rejects_foreign_schema_version() {
        let json = r#"{
            "kind": "boosted",
            "schema_version": 99,
            "feature_names": ["x"],
            "base_score": 0.0,
            "trees": []
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).expect("valid json");
        assert!(artifact.into_scorer().is_err());
    }

    #[test]
    fn save_then_load_through_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(dir.path());
        let tree = RegressionTree::new(vec![TreeNode::Leaf { value: 4.0 }], 1).expect("leaf");
        let forest = RandomForest::new(vec!["x".into()], vec![tree]).expect("valid forest");
        let artifact = ModelArtifact::Forest {
            schema_version: SCHEMA_VERSION,
            model: forest,
        };
        let path = store
            .save(&artifact, Target::Demand, "oslo")
            .expect("writable temp dir");
        assert!(path.ends_with("forest_demand_oslo.json"));

        let loaded = store
            .load(ModelKind::Forest, Target::Demand, "oslo")
            .expect("readable artifact");
        assert_eq!(loaded.map(|s| s.score(&[0.0])), Some(4.0));
        assert!(store
            .load(ModelKind::Linear, Target::Demand, "oslo")
            .expect("missing is not an error")
            .is_none());
    }

    #[test]
    fn partial_store_yields_incomplete_predictor() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(dir.path());
        let predictor = store
            .load_predictor("bergen", EnsembleWeights::default())
            .expect("empty dir is readable");
        assert!(!predictor.is_complete(Target::Demand));
        assert!(!predictor.is_complete(Target::Price));
    }
}
