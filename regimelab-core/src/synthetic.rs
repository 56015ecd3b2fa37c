//! Seeded synthetic market data for tests, benches, and offline demo runs.
//!
//! A geometric random walk with Gaussian hourly returns and uniform volume.
//! The same seed always produces the same bar sequence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::PriceBar;

/// Parameters for the synthetic walk.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub base_price: f64,
    /// Per-bar drift of the return distribution.
    pub drift: f64,
    /// Per-bar return standard deviation.
    pub volatility: f64,
    pub volume_min: f64,
    pub volume_max: f64,
    pub start: DateTime<Utc>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base_price: 66_000.0,
            drift: 0.0001,
            volatility: 0.015,
            volume_min: 500_000.0,
            volume_max: 2_000_000.0,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

/// Generate `n` hourly bars from a seed.
pub fn generate_bars(n: usize, seed: u64, config: &SyntheticConfig) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut price = config.base_price;

    for i in 0..n {
        // Box-Muller keeps the dependency surface at rand's uniform sampler.
        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = rng.gen_range(0.0..1.0);
        let gaussian = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        let ret = config.drift + config.volatility * gaussian;

        let open = price;
        price *= 1.0 + ret;
        let close = price;
        let span = close.max(open) * rng.gen_range(0.0..0.005);
        let high = close.max(open) + span;
        let low = (close.min(open) - span).max(0.01);
        let volume = rng.gen_range(config.volume_min..config.volume_max);

        bars.push(PriceBar {
            timestamp: config.start + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bars() {
        let config = SyntheticConfig::default();
        let a = generate_bars(100, 42, &config);
        let b = generate_bars(100, 42, &config);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.close, y.close);
            assert_eq!(x.volume, y.volume);
        }
    }

    #[test]
    fn different_seed_different_bars() {
        let config = SyntheticConfig::default();
        let a = generate_bars(100, 1, &config);
        let b = generate_bars(100, 2, &config);
        assert!(a.iter().zip(&b).any(|(x, y)| x.close != y.close));
    }

    #[test]
    fn bars_are_sane_and_ordered() {
        let bars = generate_bars(500, 7, &SyntheticConfig::default());
        assert_eq!(bars.len(), 500);
        for bar in &bars {
            assert!(bar.is_sane(), "insane bar: {bar:?}");
        }
        for pair in bars.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }
}
