//! Recursive multi-day forecasting of daily electricity demand and price.
//!
//! A fixed-weight ensemble of linear, random-forest and gradient-boosted
//! scorers predicts one day ahead; each prediction is appended to history so
//! the next day's lag, rolling and difference features can be derived from it.

pub mod cli;
pub mod config;
pub mod error;
/// Lag, rolling and difference features and their versioned schema.
pub mod features;
/// The recursive engine, its clock, and backtest evaluation.
pub mod forecast;
pub mod history;
pub mod io;
pub mod model;
pub mod runner;
pub mod synthetic;

pub use error::{DataError, ForecastError};
