//! Error types for the forecasting core and its IO seams.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{ModelKind, Target};

/// Precondition and configuration failures raised by the forecasting core.
///
/// None of these are transient: the core performs no IO, so every variant
/// aborts the run for the affected city.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient seed history: need at least {required} rows, got {available}")]
    InsufficientSeed { required: usize, available: usize },

    #[error(
        "insufficient history for `{feature}`: needs {required} rows, buffer holds {available}"
    )]
    InsufficientHistory {
        feature: String,
        required: usize,
        available: usize,
    },

    #[error("offset {offset} is out of range for a buffer of {len} rows")]
    OutOfRange { offset: isize, len: usize },

    #[error("{kind} model for {target} is not loaded")]
    ModelNotLoaded { target: Target, kind: ModelKind },

    #[error("horizon must be a positive number of days, got {0}")]
    InvalidHorizon(usize),

    #[error("forecast date {date} collides with history ending {last}")]
    TimestampCollision { date: NaiveDate, last: NaiveDate },

    #[error("history is not contiguous: expected {expected}, found {found}")]
    NonContiguousHistory { expected: NaiveDate, found: NaiveDate },

    #[error("feature schema mismatch for {kind} {target} model: {detail}")]
    SchemaMismatch {
        target: Target,
        kind: ModelKind,
        detail: String,
    },

    #[error("column `{0}` is missing from the latest observation")]
    MissingColumn(String),

    #[error("no calendar day follows {0}")]
    CalendarOverflow(NaiveDate),

    #[error("engine has not been seeded")]
    NotSeeded,

    #[error("forecast run already started; build a new engine")]
    EngineFinished,
}

/// Failures at the file boundary: feature tables, model artifacts, forecast output.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid model artifact `{path}`: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("feature table is missing required column `{0}`")]
    MissingColumn(String),

    #[error("row {row}, column `{column}`: cannot parse `{value}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl DataError {
    /// Wraps an `io::Error` with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_seed_message_names_both_counts() {
        let err = ForecastError::InsufficientSeed {
            required: 7,
            available: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains('7') && msg.contains('5'), "{msg}");
    }

    #[test]
    fn model_not_loaded_names_target_and_kind() {
        let err = ForecastError::ModelNotLoaded {
            target: Target::Price,
            kind: ModelKind::Boosted,
        };
        assert_eq!(err.to_string(), "boosted model for price is not loaded");
    }

    #[test]
    fn forecast_error_converts_into_data_error() {
        let err: DataError = ForecastError::InvalidHorizon(0).into();
        assert!(matches!(
            err,
            DataError::Forecast(ForecastError::InvalidHorizon(0))
        ));
    }
}
