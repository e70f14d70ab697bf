//! Engine configuration, lifecycle state and output records.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::features::MIN_SEED_ROWS;

/// Per-run engine settings, passed in at construction.
///
/// # Examples
///
/// ```
/// use grid_forecast::forecast::types::EngineConfig;
///
/// let cfg = EngineConfig::default();
/// assert_eq!(cfg.min_seed_rows, 7);
/// assert!(cfg.start_date.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Floor on real history rows; the schema may require more.
    pub min_seed_rows: usize,
    /// First forecast date. `None` means the day after the seed history.
    pub start_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_seed_rows: MIN_SEED_ROWS,
            start_date: None,
        }
    }
}

/// Lifecycle of one forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for seed history.
    Seeding,
    /// Seeded; `completed` steps produced so far.
    Stepping { completed: usize },
    /// Run finished; records were handed out.
    Done,
}

/// One forecast day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRecord {
    #[serde(rename = "datetime")]
    pub date: NaiveDate,
    pub predicted_demand: f64,
    pub predicted_price: f64,
}

impl fmt::Display for ForecastRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | demand={:>10.2}  price={:>8.2}",
            self.date, self.predicted_demand, self.predicted_price
        )
    }
}
