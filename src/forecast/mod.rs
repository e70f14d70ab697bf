//! The recursive forecast loop and its evaluation helpers.

pub mod backtest;
pub mod clock;
pub mod engine;
pub mod metrics;
pub mod naive;
pub mod types;

pub use backtest::{BacktestLine, BacktestReport, Forecaster, backtest, default_holdout};
pub use clock::DayClock;
pub use engine::{ForecastEngine, forecast};
pub use naive::NaiveForecast;
pub use types::{EngineConfig, EngineState, ForecastRecord};
