//! Persistence baseline for backtests.

/// Naive "tomorrow is today" forecaster.
///
/// Repeats the last observed value across the horizon. Backtests report it
/// next to the ensemble so a skill score has something to beat.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveForecast;

impl NaiveForecast {
    /// Produce a naive forecast for the given horizon.
    ///
    /// # Arguments
    ///
    /// * `history` - Observed values, oldest first
    /// * `horizon` - Number of days to forecast
    ///
    /// # Returns
    ///
    /// `horizon` copies of the last value, or an empty vector when there is
    /// no history to persist.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        match history.last() {
            Some(&last) => vec![last; horizon],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NaiveForecast;

    #[test]
    fn repeats_last_value() {
        let forecast = NaiveForecast.forecast(&[1.0, 2.0, 3.0], 4);
        assert_eq!(forecast, vec![3.0; 4]);
    }

    #[test]
    fn empty_history_gives_nothing() {
        assert!(NaiveForecast.forecast(&[], 7).is_empty());
    }

    #[test]
    fn zero_horizon_is_empty() {
        assert!(NaiveForecast.forecast(&[5.0], 0).is_empty());
    }
}
