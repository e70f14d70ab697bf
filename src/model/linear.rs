use serde::{Deserialize, Serialize};

use super::{ModelKind, Scorer};
use crate::error::DataError;

/// Linear regression: `intercept + Σ coefficient_i * x_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    /// # Errors
    ///
    /// `MalformedModel` when there is not one coefficient per feature.
    pub fn new(
        feature_names: Vec<String>,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, DataError> {
        let model = Self {
            feature_names,
            intercept,
            coefficients,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks the coefficient count against the feature list.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(DataError::MalformedModel(format!(
                "linear model has {} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Scorer for LinearModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn score(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}
