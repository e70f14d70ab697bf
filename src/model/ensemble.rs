//! Fixed-weight blend of the linear, forest and boosted scorers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ModelKind, Scorer, Target};
use crate::error::ForecastError;
use crate::features::{FeatureSchema, FeatureVector};

/// Something that turns a feature vector into a forecast for one target.
///
/// The engine is generic over this so tests can substitute stubs for the
/// trained ensemble.
pub trait Predictor {
    fn predict(&self, target: Target, features: &FeatureVector) -> Result<f64, ForecastError>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, target: Target, features: &FeatureVector) -> Result<f64, ForecastError> {
        (**self).predict(target, features)
    }
}

/// Blend weights, one per model family.
///
/// Assumed non-negative and summing to 1.0; config validation checks this
/// once and the predictor does not re-check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnsembleWeights {
    pub linear: f64,
    pub forest: f64,
    pub boosted: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            linear: 0.2,
            forest: 0.3,
            boosted: 0.5,
        }
    }
}

impl EnsembleWeights {
    pub fn weight(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::Linear => self.linear,
            ModelKind::Forest => self.forest,
            ModelKind::Boosted => self.boosted,
        }
    }

    pub fn sum(&self) -> f64 {
        self.linear + self.forest + self.boosted
    }
}

/// The three scorer slots for one target.
#[derive(Debug, Clone, Default)]
struct ModelSet {
    linear: Option<Arc<dyn Scorer>>,
    forest: Option<Arc<dyn Scorer>>,
    boosted: Option<Arc<dyn Scorer>>,
}

impl ModelSet {
    fn slot(&self, kind: ModelKind) -> Option<&Arc<dyn Scorer>> {
        match kind {
            ModelKind::Linear => self.linear.as_ref(),
            ModelKind::Forest => self.forest.as_ref(),
            ModelKind::Boosted => self.boosted.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: ModelKind) -> &mut Option<Arc<dyn Scorer>> {
        match kind {
            ModelKind::Linear => &mut self.linear,
            ModelKind::Forest => &mut self.forest,
            ModelKind::Boosted => &mut self.boosted,
        }
    }
}

/// Three scorers per target blended with fixed weights.
///
/// A target is all-or-nothing: if any of its three scorers is missing,
/// prediction fails with `ModelNotLoaded`.
#[derive(Debug, Clone, Default)]
pub struct EnsemblePredictor {
    weights: EnsembleWeights,
    demand: ModelSet,
    price: ModelSet,
}

impl EnsemblePredictor {
    pub fn new(weights: EnsembleWeights) -> Self {
        Self {
            weights,
            demand: ModelSet::default(),
            price: ModelSet::default(),
        }
    }

    /// Installs `scorer` in the slot matching its kind, replacing any previous one.
    pub fn insert(&mut self, target: Target, scorer: Arc<dyn Scorer>) {
        let kind = scorer.kind();
        *self.set_mut(target).slot_mut(kind) = Some(scorer);
    }

    /// Builder form of [`EnsemblePredictor::insert`].
    pub fn with_scorer(mut self, target: Target, scorer: Arc<dyn Scorer>) -> Self {
        self.insert(target, scorer);
        self
    }

    pub fn weights(&self) -> &EnsembleWeights {
        &self.weights
    }

    /// Whether all three scorers for `target` are present.
    pub fn is_complete(&self, target: Target) -> bool {
        ModelKind::ALL
            .iter()
            .all(|&kind| self.set(target).slot(kind).is_some())
    }

    /// Fails with `ModelNotLoaded` naming the first missing scorer for `target`.
    pub fn ensure_complete(&self, target: Target) -> Result<(), ForecastError> {
        for kind in ModelKind::ALL {
            self.scorer(target, kind)?;
        }
        Ok(())
    }

    /// Checks every loaded scorer was trained on exactly `schema`'s features.
    pub fn verify_schema(&self, schema: &FeatureSchema) -> Result<(), ForecastError> {
        let names = schema.names();
        for target in Target::ALL {
            for kind in ModelKind::ALL {
                if let Some(scorer) = self.set(target).slot(kind) {
                    check_names(target, kind, scorer.feature_names(), &names)?;
                }
            }
        }
        Ok(())
    }

    /// Each scorer's raw output for `target`, in [`ModelKind::ALL`] order.
    pub fn score_each(
        &self,
        target: Target,
        features: &FeatureVector,
    ) -> Result<[f64; 3], ForecastError> {
        let mut out = [0.0; 3];
        for (slot, kind) in out.iter_mut().zip(ModelKind::ALL) {
            let scorer = self.scorer(target, kind)?;
            check_names(target, kind, scorer.feature_names(), features.names())?;
            *slot = scorer.score(features.values());
        }
        Ok(out)
    }

    fn scorer(&self, target: Target, kind: ModelKind) -> Result<&Arc<dyn Scorer>, ForecastError> {
        self.set(target)
            .slot(kind)
            .ok_or(ForecastError::ModelNotLoaded { target, kind })
    }

    fn set(&self, target: Target) -> &ModelSet {
        match target {
            Target::Demand => &self.demand,
            Target::Price => &self.price,
        }
    }

    fn set_mut(&mut self, target: Target) -> &mut ModelSet {
        match target {
            Target::Demand => &mut self.demand,
            Target::Price => &mut self.price,
        }
    }
}

impl Predictor for EnsemblePredictor {
    fn predict(&self, target: Target, features: &FeatureVector) -> Result<f64, ForecastError> {
        let scores = self.score_each(target, features)?;
        Ok(ModelKind::ALL
            .into_iter()
            .zip(scores)
            .map(|(kind, score)| self.weights.weight(kind) * score)
            .sum())
    }
}

fn check_names(
    target: Target,
    kind: ModelKind,
    trained: &[String],
    presented: &[String],
) -> Result<(), ForecastError> {
    if trained == presented {
        return Ok(());
    }
    let detail = match trained.iter().zip(presented).position(|(a, b)| a != b) {
        Some(i) => format!(
            "feature {i} is `{}` but the model expects `{}`",
            presented[i], trained[i]
        ),
        None => format!(
            "{} features presented, model expects {}",
            presented.len(),
            trained.len()
        ),
    };
    Err(ForecastError::SchemaMismatch {
        target,
        kind,
        detail,
    })
}
