//! Seeded synthetic daily history and hand-set demo models.
//!
//! Used by the `demo` command and by tests that need plausible history
//! without a feature table on disk.

use std::f64::consts::PI;

use chrono::{Datelike, Days, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::DataError;
use crate::features::FeatureSchema;
use crate::history::Observation;
use crate::history::observation::{PRICE_HEADER, TEMP_HEADER};
use crate::model::{
    BoostedTrees, EnsemblePredictor, EnsembleWeights, LinearModel, ModelArtifact, RandomForest,
    RegressionTree, Target, TreeNode,
};

/// Generator of daily load, price and temperature for one city.
///
/// Temperature follows an annual cosine (coldest mid-January), load rises as
/// temperature falls and dips at weekends, and price follows load. Each field
/// gets Gaussian noise from a seeded RNG, so the same seed always yields the
/// same history.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use grid_forecast::synthetic::DailyProfile;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rows = DailyProfile::new(42).history(start, 30);
/// assert_eq!(rows.len(), 30);
/// assert!(rows.iter().all(|r| r.load() > 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct DailyProfile {
    /// Mean daily load (MW).
    pub base_load: f64,
    /// Weekday/weekend swing in load (MW).
    pub weekly_amp: f64,
    /// Load change per °C above the mean temperature (MW, negative for heating).
    pub temp_sensitivity: f64,
    /// Annual mean temperature (°C).
    pub temp_mean: f64,
    /// Annual temperature swing (°C).
    pub temp_amp: f64,
    /// Mean day-ahead price.
    pub price_base: f64,
    /// Price change per MW of load above `base_load`.
    pub price_per_mw: f64,
    /// Relative standard deviation of the noise on every field.
    pub noise_rel: f64,

    /// Random number generator for noise generation
    rng: StdRng,
}

impl DailyProfile {
    /// A Nordic-looking profile seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            base_load: 4000.0,
            weekly_amp: 250.0,
            temp_sensitivity: -60.0,
            temp_mean: 6.0,
            temp_amp: 10.0,
            price_base: 45.0,
            price_per_mw: 0.02,
            noise_rel: 0.02,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates `days` consecutive observations starting at `start`.
    ///
    /// Stops early only if the calendar overflows.
    pub fn history(&mut self, start: NaiveDate, days: usize) -> Vec<Observation> {
        let mut rows = Vec::with_capacity(days);
        let mut date = start;
        for _ in 0..days {
            rows.push(self.observation(date));
            match date.checked_add_days(Days::new(1)) {
                Some(next) => date = next,
                None => break,
            }
        }
        rows
    }

    fn observation(&mut self, date: NaiveDate) -> Observation {
        let year_pos = (f64::from(date.ordinal()) - 15.0) / 365.25;
        let temp_c = self.temp_mean - self.temp_amp * (2.0 * PI * year_pos).cos()
            + self.noise(self.temp_amp);

        // Monday = 0; cos peaks midweek-ish and bottoms at the weekend
        let week_pos = (f64::from(date.weekday().num_days_from_monday()) - 2.0) / 7.0;
        let weekly = (2.0 * PI * week_pos).cos();

        let load = self.base_load
            + self.weekly_amp * weekly
            + self.temp_sensitivity * (temp_c - self.temp_mean)
            + self.noise(self.base_load);
        let price = self.price_base
            + self.price_per_mw * (load - self.base_load)
            + self.noise(self.price_base);

        Observation::new(date, load.max(0.0), price, temp_c)
    }

    fn noise(&mut self, scale: f64) -> f64 {
        let std = self.noise_rel * scale;
        if std <= 0.0 {
            return 0.0;
        }
        // Box-Muller
        let u1: f64 = self.rng.random::<f64>().clamp(1e-12, 1.0);
        let u2: f64 = self.rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * std
    }

    /// Hand-set linear, forest and boosted artifacts for both targets over `schema`.
    ///
    /// Linear models mix persistence with the weekly mean, the forest keys
    /// load off temperature, and the boosted model pulls toward the profile
    /// means. Features the schema lacks simply get no weight.
    ///
    /// # Errors
    ///
    /// `MalformedModel` if a hand-set model is inconsistent with `schema`.
    pub fn demo_artifacts(
        &self,
        schema: &FeatureSchema,
    ) -> Result<Vec<(Target, ModelArtifact)>, DataError> {
        let names = schema.names();
        let index = |name: &str| names.iter().position(|n| n == name);
        let weights = |pairs: &[(&str, f64)]| {
            let mut coefficients = vec![0.0; names.len()];
            for &(name, w) in pairs {
                if let Some(i) = index(name) {
                    coefficients[i] = w;
                }
            }
            coefficients
        };
        let stump = |feature: Option<usize>, threshold: f64, low: f64, high: f64| match feature {
            Some(feature) => RegressionTree::new(
                vec![
                    TreeNode::Split {
                        feature,
                        threshold,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: low },
                    TreeNode::Leaf { value: high },
                ],
                names.len(),
            ),
            None => Ok(RegressionTree::constant((low + high) / 2.0)),
        };

        let temp = index(TEMP_HEADER);
        let swing = self.temp_sensitivity * self.temp_amp / 2.0;
        let cold = self.base_load - swing;
        let mild = self.base_load + swing;
        let price_swing = self.price_per_mw * swing;

        let demand = [
            ModelArtifact::Linear {
                schema_version: schema.version(),
                model: LinearModel::new(
                    names.clone(),
                    0.0,
                    weights(&[("demand_lag1", 0.55), ("demand_roll7", 0.35), ("demand_lag7", 0.10)]),
                )?,
            },
            ModelArtifact::Forest {
                schema_version: schema.version(),
                model: RandomForest::new(
                    names.clone(),
                    vec![
                        stump(temp, self.temp_mean - 5.0, cold, self.base_load)?,
                        stump(temp, self.temp_mean + 5.0, self.base_load, mild)?,
                    ],
                )?,
            },
            ModelArtifact::Boosted {
                schema_version: schema.version(),
                model: BoostedTrees::new(
                    names.clone(),
                    self.base_load,
                    vec![stump(
                        index("demand_lag1"),
                        self.base_load,
                        self.weekly_amp / 4.0,
                        -self.weekly_amp / 4.0,
                    )?],
                )?,
            },
        ];

        let price = [
            ModelArtifact::Linear {
                schema_version: schema.version(),
                model: LinearModel::new(
                    names.clone(),
                    0.0,
                    weights(&[("price_lag1", 0.6), ("price_roll7", 0.3), ("price_lag7", 0.1)]),
                )?,
            },
            ModelArtifact::Forest {
                schema_version: schema.version(),
                model: RandomForest::new(
                    names.clone(),
                    vec![stump(
                        temp,
                        self.temp_mean,
                        self.price_base - price_swing,
                        self.price_base + price_swing,
                    )?],
                )?,
            },
            ModelArtifact::Boosted {
                schema_version: schema.version(),
                model: BoostedTrees::new(
                    names.clone(),
                    self.price_base,
                    vec![stump(index(PRICE_HEADER), self.price_base, 1.0, -1.0)?],
                )?,
            },
        ];

        Ok(demand
            .into_iter()
            .map(|a| (Target::Demand, a))
            .chain(price.into_iter().map(|a| (Target::Price, a)))
            .collect())
    }

    /// A complete ensemble built from [`DailyProfile::demo_artifacts`].
    ///
    /// # Errors
    ///
    /// `MalformedModel` if an artifact fails validation.
    pub fn demo_predictor(
        &self,
        schema: &FeatureSchema,
        weights: EnsembleWeights,
    ) -> Result<EnsemblePredictor, DataError> {
        let mut predictor = EnsemblePredictor::new(weights);
        for (target, artifact) in self.demo_artifacts(schema)? {
            predictor.insert(target, artifact.into_scorer()?);
        }
        Ok(predictor)
    }
}
