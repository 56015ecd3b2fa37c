//! Rolling-window statistics: small pure helpers shared by the detector,
//! the spread path in the simulator, and tests.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
///
/// Returns 0.0 for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// The trailing `window` elements, or `None` if the window is not fully
/// populated.
pub fn trailing(values: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(&values[values.len() - window..])
}

/// Percent-change returns: `returns[i] = prices[i+1] / prices[i] - 1`.
///
/// Output length is `prices.len() - 1` (empty for fewer than 2 prices).
/// A zero denominator yields a 0.0 return rather than an infinity.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}
