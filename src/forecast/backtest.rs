//! One-step-ahead holdout evaluation of each scorer, the ensemble and the naive baseline.

use std::fmt;

use tracing::debug;

use super::metrics::{mae, rmse};
use super::naive::NaiveForecast;
use crate::error::ForecastError;
use crate::features::{FeatureSchema, derive};
use crate::history::{Column, HistoryBuffer, Observation};
use crate::model::{EnsemblePredictor, ModelKind, Predictor, Target};

/// Holdout length used when none is given: the last 30 days of a table longer
/// than 40 rows, otherwise a fifth of it (at least one row).
pub fn default_holdout(rows: usize) -> usize {
    if rows > 40 { 30 } else { (rows / 5).max(1) }
}

/// What produced a line of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forecaster {
    Naive,
    Model(ModelKind),
    Ensemble,
}

impl Forecaster {
    /// Report order: baseline, the three scorers, then the blend.
    pub const ALL: [Forecaster; 5] = [
        Forecaster::Naive,
        Forecaster::Model(ModelKind::Linear),
        Forecaster::Model(ModelKind::Forest),
        Forecaster::Model(ModelKind::Boosted),
        Forecaster::Ensemble,
    ];

    fn index(self) -> usize {
        match self {
            Self::Naive => 0,
            Self::Model(ModelKind::Linear) => 1,
            Self::Model(ModelKind::Forest) => 2,
            Self::Model(ModelKind::Boosted) => 3,
            Self::Ensemble => 4,
        }
    }
}

impl fmt::Display for Forecaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => f.write_str("naive"),
            Self::Model(kind) => write!(f, "{kind}"),
            Self::Ensemble => f.write_str("ensemble"),
        }
    }
}

/// Error metrics for one forecaster on one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestLine {
    pub forecaster: Forecaster,
    pub target: Target,
    pub mae: f64,
    pub rmse: f64,
}

/// Holdout evaluation results, grouped by target in [`Forecaster::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub holdout_days: usize,
    pub lines: Vec<BacktestLine>,
}

impl BacktestReport {
    pub fn line(&self, forecaster: Forecaster, target: Target) -> Option<&BacktestLine> {
        self.lines
            .iter()
            .find(|l| l.forecaster == forecaster && l.target == target)
    }
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Backtest ({} day holdout) ---", self.holdout_days)?;
        writeln!(f, "{:<8} {:<9} {:>12} {:>12}", "target", "model", "MAE", "RMSE")?;
        for (i, l) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<8} {:<9} {:>12.3} {:>12.3}",
                l.target.as_str(),
                l.forecaster.to_string(),
                l.mae,
                l.rmse
            )?;
        }
        Ok(())
    }
}

/// Replays the last `holdout` rows one step at a time.
///
/// Every step derives features from the *actual* preceding history, so the
/// report measures one-day-ahead skill without recursive error build-up.
/// After scoring, the actual row is appended before the next step.
///
/// # Arguments
///
/// * `rows` - Full feature table history, oldest first
/// * `schema` - Feature schema the scorers were trained on
/// * `predictor` - Complete ensemble for both targets
/// * `holdout` - Number of trailing rows to score
///
/// # Errors
///
/// * `InvalidHorizon` - `holdout` is zero
/// * `InsufficientSeed` - fewer than `schema.min_seed()` rows precede the holdout
/// * `ModelNotLoaded` / `SchemaMismatch` - the predictor cannot score the schema
pub fn backtest(
    rows: &[Observation],
    schema: &FeatureSchema,
    predictor: &EnsemblePredictor,
    holdout: usize,
) -> Result<BacktestReport, ForecastError> {
    if holdout == 0 {
        return Err(ForecastError::InvalidHorizon(holdout));
    }
    let required = schema.min_seed() + holdout;
    if rows.len() < required {
        return Err(ForecastError::InsufficientSeed {
            required,
            available: rows.len(),
        });
    }

    let split = rows.len() - holdout;
    let mut buffer = HistoryBuffer::load(rows[..split].to_vec())?;

    // predictions[target][forecaster][day]
    let mut predictions = [
        [(); 5].map(|_| Vec::with_capacity(holdout)),
        [(); 5].map(|_| Vec::with_capacity(holdout)),
    ];
    let mut actuals = [Vec::with_capacity(holdout), Vec::with_capacity(holdout)];

    for actual in &rows[split..] {
        let features = derive(&buffer, schema)?;
        for (t, target) in Target::ALL.into_iter().enumerate() {
            let column = target_column(target);
            let history = [buffer.latest()?.value(&column).unwrap_or(f64::NAN)];
            let naive = NaiveForecast.forecast(&history, 1);
            let [linear, forest, boosted] = predictor.score_each(target, &features)?;
            let ensemble = predictor.predict(target, &features)?;

            let per_day = &mut predictions[t];
            per_day[Forecaster::Naive.index()].extend(naive);
            per_day[Forecaster::Model(ModelKind::Linear).index()].push(linear);
            per_day[Forecaster::Model(ModelKind::Forest).index()].push(forest);
            per_day[Forecaster::Model(ModelKind::Boosted).index()].push(boosted);
            per_day[Forecaster::Ensemble.index()].push(ensemble);
            actuals[t].push(actual.value(&column).unwrap_or(f64::NAN));
        }
        buffer.append(actual.clone())?;
    }

    let mut lines = Vec::with_capacity(Target::ALL.len() * Forecaster::ALL.len());
    for (t, target) in Target::ALL.into_iter().enumerate() {
        for forecaster in Forecaster::ALL {
            let predicted = &predictions[t][forecaster.index()];
            let actual = &actuals[t];
            let (Some(abs_err), Some(sq_err)) = (mae(predicted, actual), rmse(predicted, actual))
            else {
                continue;
            };
            lines.push(BacktestLine {
                forecaster,
                target,
                mae: abs_err,
                rmse: sq_err,
            });
        }
    }

    debug!(holdout, lines = lines.len(), "backtest complete");
    Ok(BacktestReport {
        holdout_days: holdout,
        lines,
    })
}

fn target_column(target: Target) -> Column {
    match target {
        Target::Demand => Column::Load,
        Target::Price => Column::Price,
    }
}
