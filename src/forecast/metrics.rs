//! Point-forecast error metrics.

/// Mean absolute error between paired predictions and actuals.
///
/// Returns `None` when the slices are empty or of different length.
pub fn mae(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    paired(predicted, actual)?;
    let abs_sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum();
    Some(abs_sum / predicted.len() as f64)
}

/// Root-mean-square error between paired predictions and actuals.
///
/// Returns `None` when the slices are empty or of different length.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    paired(predicted, actual)?;
    let sq_sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum();
    Some((sq_sum / predicted.len() as f64).sqrt())
}

fn paired(predicted: &[f64], actual: &[f64]) -> Option<()> {
    (!predicted.is_empty() && predicted.len() == actual.len()).then_some(())
}
