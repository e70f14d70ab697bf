//! Feature derivation for the next, not yet observed, day.

use super::schema::{FeatureRule, FeatureSchema};
use super::vector::FeatureVector;
use crate::error::ForecastError;
use crate::history::HistoryBuffer;

/// Derives the feature vector for the day after the buffer's latest row.
///
/// The latest row sits one step before the forecast day, so a lag of `k`
/// days reads offset `-(k - 1)` and a rolling window of `w` days covers the
/// last `w` rows. A difference of `k > 1` days is the latest value minus the
/// `k`-day lag; `diff1` compares with the row before the latest. Nothing is
/// backfilled: a rule whose window is not covered fails with
/// `InsufficientHistory`.
///
/// Pure: the same buffer contents always yield the same vector.
pub fn derive(
    buffer: &HistoryBuffer,
    schema: &FeatureSchema,
) -> Result<FeatureVector, ForecastError> {
    let mut pairs = Vec::with_capacity(schema.len());

    for rule in schema.rules() {
        let required = rule.lookback();
        if buffer.len() < required {
            return Err(ForecastError::InsufficientHistory {
                feature: rule.name(),
                required,
                available: buffer.len(),
            });
        }
        pairs.push((rule.name(), evaluate(buffer, rule)?));
    }

    Ok(pairs.into_iter().collect())
}

fn evaluate(buffer: &HistoryBuffer, rule: &FeatureRule) -> Result<f64, ForecastError> {
    match rule {
        FeatureRule::Lag { column, steps } => buffer.value_at(column, 1 - *steps as isize),
        FeatureRule::Rolling { column, window } => buffer.trailing_mean(column, *window),
        FeatureRule::Diff { column, steps } => {
            let latest = buffer.value_at(column, 0)?;
            let earlier = buffer.value_at(column, -((*steps).max(2) as isize - 1))?;
            Ok(latest - earlier)
        }
        FeatureRule::Static { column } => buffer.value_at(column, 0),
    }
}
