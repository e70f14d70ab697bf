//! Append-only, day-contiguous history of observations.

use chrono::{Days, NaiveDate};

use super::observation::{Column, Observation};
use crate::error::ForecastError;

/// Time-ordered daily rows, actual and synthesized.
///
/// Dates are strictly increasing by exactly one day. The buffer only grows;
/// there is no removal.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    rows: Vec<Observation>,
}

impl HistoryBuffer {
    /// Builds a buffer from ordered rows, rejecting duplicates and gaps.
    ///
    /// # Errors
    ///
    /// `TimestampCollision` for a repeated or decreasing date,
    /// `NonContiguousHistory` for a missing day.
    pub fn load(rows: Vec<Observation>) -> Result<Self, ForecastError> {
        let mut buffer = Self {
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            buffer.append(row)?;
        }
        Ok(buffer)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Most recent row.
    pub fn latest(&self) -> Result<&Observation, ForecastError> {
        self.at_offset(0)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(Observation::date)
    }

    /// Row `|k|` steps before the latest; `at_offset(0)` is the latest itself.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for positive `k` or when `|k|` reaches past the first row.
    pub fn at_offset(&self, k: isize) -> Result<&Observation, ForecastError> {
        let out_of_range = ForecastError::OutOfRange {
            offset: k,
            len: self.rows.len(),
        };
        if k > 0 {
            return Err(out_of_range);
        }
        let back = k.unsigned_abs();
        if back >= self.rows.len() {
            return Err(out_of_range);
        }
        Ok(&self.rows[self.rows.len() - 1 - back])
    }

    /// Value of `column` at offset `k` (see [`HistoryBuffer::at_offset`]).
    pub fn value_at(&self, column: &Column, k: isize) -> Result<f64, ForecastError> {
        let row = self.at_offset(k)?;
        row.value(column)
            .ok_or_else(|| ForecastError::MissingColumn(column.header().to_string()))
    }

    /// Mean of `column` over the `window` rows before the tail (offsets `-window..=-1`).
    ///
    /// # Errors
    ///
    /// `InsufficientHistory` when fewer than `window` rows precede the tail.
    pub fn rolling_mean(&self, column: &Column, window: usize) -> Result<f64, ForecastError> {
        let required = window + 1;
        if window == 0 || self.rows.len() < required {
            return Err(ForecastError::InsufficientHistory {
                feature: format!("{column} rolling mean over {window}"),
                required,
                available: self.rows.len(),
            });
        }
        let end = self.rows.len() - 1;
        self.mean_over(column, end - window, end)
    }

    /// Mean of `column` over the last `window` rows, tail included.
    ///
    /// This is the window that precedes the next, not yet observed, day.
    pub fn trailing_mean(&self, column: &Column, window: usize) -> Result<f64, ForecastError> {
        if window == 0 || self.rows.len() < window {
            return Err(ForecastError::InsufficientHistory {
                feature: format!("{column} trailing mean over {window}"),
                required: window,
                available: self.rows.len(),
            });
        }
        let end = self.rows.len();
        self.mean_over(column, end - window, end)
    }

    /// Values of `column` in date order; rows missing the column are skipped.
    pub fn column_values(&self, column: &Column) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.value(column)).collect()
    }

    /// Appends the next day's row.
    ///
    /// The caller stamps the date; it must be exactly one day after the latest.
    ///
    /// # Errors
    ///
    /// `TimestampCollision` when the date is not after the latest row,
    /// `NonContiguousHistory` when it skips a day.
    pub fn append(&mut self, row: Observation) -> Result<(), ForecastError> {
        if let Some(last) = self.last_date() {
            let date = row.date();
            if date <= last {
                return Err(ForecastError::TimestampCollision { date, last });
            }
            let expected = last.checked_add_days(Days::new(1)).unwrap_or(last);
            if date != expected {
                return Err(ForecastError::NonContiguousHistory {
                    expected,
                    found: date,
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    fn mean_over(&self, column: &Column, start: usize, end: usize) -> Result<f64, ForecastError> {
        let mut sum = 0.0;
        for row in &self.rows[start..end] {
            sum += row
                .value(column)
                .ok_or_else(|| ForecastError::MissingColumn(column.header().to_string()))?;
        }
        Ok(sum / (end - start) as f64)
    }
}
