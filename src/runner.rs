//! Multi-city orchestration: load, forecast, export, with per-city error isolation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::ForecastConfig;
use crate::error::DataError;
use crate::forecast::{BacktestReport, ForecastRecord, backtest, default_holdout, forecast};
use crate::features::FeatureSchema;
use crate::history::Observation;
use crate::io::{export_forecast, feature_path, forecast_path, load_feature_table};
use crate::model::{EnsemblePredictor, ModelStore, Target};
use crate::synthetic::DailyProfile;

/// City name used for synthetic demo output.
pub const DEMO_CITY: &str = "demo";

/// A finished forecast for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityForecast {
    pub city: String,
    pub records: Vec<ForecastRecord>,
    /// Where the forecast CSV was written.
    pub path: PathBuf,
}

/// Holdout evaluation for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityEvaluation {
    pub city: String,
    pub report: BacktestReport,
}

/// A city whose run failed, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCity {
    pub city: String,
    pub reason: String,
}

/// Outcome of a multi-city run. Cities appear in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<T> {
    pub completed: Vec<T>,
    pub skipped: Vec<SkippedCity>,
}

impl<T> RunSummary<T> {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Forecasts one city and writes `forecast_<city>.csv`.
///
/// # Errors
///
/// Any failure loading the feature table or models, an incomplete or
/// schema-inconsistent ensemble, any engine precondition, or a write error.
pub fn forecast_city(config: &ForecastConfig, city: &str) -> Result<CityForecast, DataError> {
    info!(city, days = config.engine.horizon_days, "forecasting city");
    let (rows, schema, predictor) = load_city(config, city)?;

    let records = forecast(
        config.engine_config(),
        schema,
        &predictor,
        rows,
        config.engine.horizon_days,
    )?;

    let path = forecast_path(&config.paths.forecast_dir, city);
    export_forecast(&records, &path)?;
    info!(city, path = %path.display(), rows = records.len(), "forecast written");

    Ok(CityForecast {
        city: city.to_string(),
        records,
        path,
    })
}

/// Backtests one city over its last `holdout` days (default by table length).
///
/// # Errors
///
/// As [`forecast_city`], minus the write.
pub fn evaluate_city(
    config: &ForecastConfig,
    city: &str,
    holdout: Option<usize>,
) -> Result<CityEvaluation, DataError> {
    let (rows, schema, predictor) = load_city(config, city)?;
    let holdout = holdout.unwrap_or_else(|| default_holdout(rows.len()));
    info!(city, holdout, "evaluating city");
    let report = backtest(&rows, &schema, &predictor, holdout)?;
    Ok(CityEvaluation {
        city: city.to_string(),
        report,
    })
}

/// Settings of a synthetic end-to-end run.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoOptions {
    pub seed: u64,
    pub start: NaiveDate,
    pub history_days: usize,
    /// Receives `forecast_demo.csv` and `models/*.json` when set.
    pub out_dir: Option<PathBuf>,
}

/// Result of [`run_demo`].
#[derive(Debug, Clone, PartialEq)]
pub struct DemoOutcome {
    pub records: Vec<ForecastRecord>,
    pub report: BacktestReport,
    /// Files written under `out_dir`, in write order.
    pub written: Vec<PathBuf>,
}

/// Generates synthetic history, backtests the demo ensemble on it, then
/// forecasts `config.engine.horizon_days` past its end.
///
/// # Errors
///
/// Engine preconditions (e.g. too few `history_days`) and write failures.
pub fn run_demo(config: &ForecastConfig, options: &DemoOptions) -> Result<DemoOutcome, DataError> {
    let mut profile = DailyProfile::new(options.seed);
    let rows = profile.history(options.start, options.history_days);
    let schema = FeatureSchema::default();
    let predictor = profile.demo_predictor(&schema, config.ensemble)?;
    info!(seed = options.seed, rows = rows.len(), "running synthetic demo");

    let report = backtest(&rows, &schema, &predictor, default_holdout(rows.len()))?;
    let records = forecast(
        config.engine_config(),
        schema.clone(),
        &predictor,
        rows,
        config.engine.horizon_days,
    )?;

    let mut written = Vec::new();
    if let Some(out_dir) = &options.out_dir {
        written = write_demo(out_dir, &profile, &schema, &records)?;
    }

    Ok(DemoOutcome {
        records,
        report,
        written,
    })
}

fn write_demo(
    out_dir: &Path,
    profile: &DailyProfile,
    schema: &FeatureSchema,
    records: &[ForecastRecord],
) -> Result<Vec<PathBuf>, DataError> {
    let store = ModelStore::new(out_dir.join("models"));
    let mut written = Vec::new();
    for (target, artifact) in profile.demo_artifacts(schema)? {
        written.push(store.save(&artifact, target, DEMO_CITY)?);
    }
    let path = forecast_path(out_dir, DEMO_CITY);
    export_forecast(records, &path)?;
    written.push(path);
    Ok(written)
}

/// Forecasts every configured city. A failing city is logged and skipped.
pub fn run_all(config: &ForecastConfig) -> RunSummary<CityForecast> {
    for_each_city(config, |city| forecast_city(config, city))
}

/// Evaluates every configured city. A failing city is logged and skipped.
pub fn evaluate_all(config: &ForecastConfig, holdout: Option<usize>) -> RunSummary<CityEvaluation> {
    for_each_city(config, |city| evaluate_city(config, city, holdout))
}

fn for_each_city<T, F>(config: &ForecastConfig, run: F) -> RunSummary<T>
where
    T: Send,
    F: Fn(&str) -> Result<T, DataError> + Sync,
{
    let cities = &config.data.cities;
    let outcomes: Vec<(&String, Result<T, DataError>)> = if config.data.parallel {
        cities
            .par_iter()
            .map(|city| (city, run(city.as_str())))
            .collect()
    } else {
        cities.iter().map(|city| (city, run(city.as_str()))).collect()
    };

    let mut summary = RunSummary {
        completed: Vec::with_capacity(outcomes.len()),
        skipped: Vec::new(),
    };
    for (city, outcome) in outcomes {
        match outcome {
            Ok(done) => summary.completed.push(done),
            Err(e) => {
                warn!(city = %city, error = %e, "skipping city");
                summary.skipped.push(SkippedCity {
                    city: city.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    summary
}

fn load_city(
    config: &ForecastConfig,
    city: &str,
) -> Result<(Vec<Observation>, FeatureSchema, EnsemblePredictor), DataError> {
    let table = load_feature_table(
        &feature_path(&config.paths.feature_dir, city),
        &config.data.exclude_columns,
    )?;
    let schema = table.schema();

    let store = ModelStore::new(&config.paths.model_dir);
    let predictor = store.load_predictor(city, config.ensemble)?;
    for target in Target::ALL {
        predictor.ensure_complete(target)?;
    }
    predictor.verify_schema(&schema)?;

    Ok((table.into_rows(), schema, predictor))
}
