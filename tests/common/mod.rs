//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use chrono::{Days, NaiveDate};

use grid_forecast::config::ForecastConfig;
use grid_forecast::error::ForecastError;
use grid_forecast::features::{FeatureSchema, FeatureVector};
use grid_forecast::history::Observation;
use grid_forecast::model::{ModelStore, Predictor, Target};
use grid_forecast::synthetic::DailyProfile;

/// First day of every fixture history.
pub fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

/// `start()` plus `n` days.
pub fn day(n: u64) -> NaiveDate {
    start().checked_add_days(Days::new(n)).expect("valid date")
}

/// Ten days: loads 100..=109, prices 50..=59, 5.0 °C throughout.
pub fn scenario_rows() -> Vec<Observation> {
    (0..10)
        .map(|i| Observation::new(day(i), 100.0 + i as f64, 50.0 + i as f64, 5.0))
        .collect()
}

/// `days` rows of seeded synthetic history.
pub fn synthetic_rows(days: usize) -> Vec<Observation> {
    DailyProfile::new(42).history(start(), days)
}

/// Predicts tomorrow as today: reads `demand_lag1` / `price_lag1`.
pub struct LagOne;

impl Predictor for LagOne {
    fn predict(&self, target: Target, features: &FeatureVector) -> Result<f64, ForecastError> {
        let name = match target {
            Target::Demand => "demand_lag1",
            Target::Price => "price_lag1",
        };
        features
            .get(name)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }
}

/// `LagOne` plus a fixed demand drift, remembering every feature vector it saw.
#[derive(Default)]
pub struct Recording {
    pub drift: f64,
    pub seen: RefCell<Vec<FeatureVector>>,
}

impl Predictor for Recording {
    fn predict(&self, target: Target, features: &FeatureVector) -> Result<f64, ForecastError> {
        let base = LagOne.predict(target, features)?;
        match target {
            Target::Demand => {
                self.seen.borrow_mut().push(features.clone());
                Ok(base + self.drift)
            }
            Target::Price => Ok(base),
        }
    }
}

/// Config whose directories all live under `root`.
pub fn config_in(root: &Path, cities: &[&str]) -> ForecastConfig {
    let mut config = ForecastConfig::nordic();
    config.paths.feature_dir = root.join("features");
    config.paths.model_dir = root.join("models");
    config.paths.forecast_dir = root.join("forecast");
    config.data.cities = cities.iter().map(|c| c.to_string()).collect();
    config
}

/// Writes `<city>_features.csv` the way the feature pipeline lays it out:
/// raw columns, engineered columns, next-day targets and a text column.
///
/// Engineered values are written as zeros; the engine recomputes them.
pub fn write_feature_table(dir: &Path, city: &str, rows: &[Observation]) {
    fs::create_dir_all(dir).expect("create feature dir");
    let schema = FeatureSchema::default();
    let mut out = String::from("datetime");
    for name in schema.names() {
        out.push(',');
        out.push_str(&name);
    }
    out.push_str(",demand_next,price_next,name\n");

    for (i, r) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{},{},{},{}",
            r.date(),
            r.load(),
            r.price(),
            r.temp_c()
        ));
        for _ in 3..schema.len() {
            out.push_str(",0");
        }
        let next = rows.get(i + 1).unwrap_or(r);
        out.push_str(&format!(",{},{},{city}\n", next.load(), next.price()));
    }
    fs::write(dir.join(format!("{city}_features.csv")), out).expect("write feature table");
}

/// Saves the demo artifacts for `city` over the default schema.
pub fn write_models(dir: &Path, city: &str) {
    let store = ModelStore::new(dir);
    let artifacts = DailyProfile::new(42)
        .demo_artifacts(&FeatureSchema::default())
        .expect("valid demo models");
    for (target, artifact) in artifacts {
        store.save(&artifact, target, city).expect("save artifact");
    }
}
