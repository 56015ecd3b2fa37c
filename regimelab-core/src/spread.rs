//! SpreadModel: dynamic execution-cost spread and realistic fill price.
//!
//! Models the bid/ask gap from volatility and relative volume. Stateless;
//! constructed once per run or shared freely across runs.

use serde::{Deserialize, Serialize};

/// Hard ceiling on the modeled spread: 0.5%.
pub const MAX_SPREAD_PCT: f64 = 0.005;

/// Which side of the book an execution crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// A derived spread quote. Not persisted; recomputed per query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadQuote {
    /// Full spread as a fraction of mid price, in (0, 0.005].
    pub spread_pct: f64,
}

/// Stateless bid/ask spread model.
#[derive(Debug, Clone)]
pub struct SpreadModel {
    base_spread_pct: f64,
}

impl Default for SpreadModel {
    fn default() -> Self {
        Self::new(0.0001)
    }
}

impl SpreadModel {
    pub fn new(base_spread_pct: f64) -> Self {
        assert!(base_spread_pct > 0.0, "base_spread_pct must be positive");
        Self { base_spread_pct }
    }

    /// Dynamic spread: `base * (1 + volatility * 10) * liquidity_multiplier`,
    /// capped at 0.5%.
    ///
    /// The liquidity multiplier doubles the spread when volume is under half
    /// its average, and widens it 1.5x when merely below average.
    pub fn spread(&self, volatility: f64, volume: f64, avg_volume: f64) -> SpreadQuote {
        let vol_multiplier = 1.0 + volatility * 10.0;

        let liquidity_multiplier = if volume < avg_volume * 0.5 {
            2.0
        } else if volume < avg_volume {
            1.5
        } else {
            1.0
        };

        let spread_pct =
            (self.base_spread_pct * vol_multiplier * liquidity_multiplier).min(MAX_SPREAD_PCT);
        SpreadQuote { spread_pct }
    }

    /// Realistic fill price: buys cross to the ask, sells to the bid.
    ///
    /// A zero spread returns `mid_price` exactly.
    pub fn execution_price(&self, mid_price: f64, side: Side, spread_pct: f64) -> f64 {
        let half_spread = spread_pct / 2.0;
        match side {
            Side::Buy => mid_price * (1.0 + half_spread),
            Side::Sell => mid_price * (1.0 - half_spread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn spread_low_liquidity_doubles() {
        // base 1 bps, 2% volatility, volume under half the average:
        // 0.0001 * 1.2 * 2.0 = 0.00024.
        let model = SpreadModel::new(0.0001);
        let quote = model.spread(0.02, 500_000.0, 1_200_000.0);
        assert!((quote.spread_pct - 0.00024).abs() < EPS);
    }

    #[test]
    fn spread_liquidity_tiers() {
        let model = SpreadModel::new(0.0001);
        // Below average but above half: 1.5x.
        let mid = model.spread(0.0, 900_000.0, 1_000_000.0);
        assert!((mid.spread_pct - 0.00015).abs() < EPS);
        // At or above average: 1.0x.
        let full = model.spread(0.0, 1_000_000.0, 1_000_000.0);
        assert!((full.spread_pct - 0.0001).abs() < EPS);
    }

    #[test]
    fn spread_capped_at_half_percent() {
        let model = SpreadModel::new(0.001);
        // 0.001 * (1 + 5.0) * 2.0 = 0.012, far over the cap.
        let quote = model.spread(0.5, 100.0, 1_000_000.0);
        assert_eq!(quote.spread_pct, MAX_SPREAD_PCT);
    }

    #[test]
    fn spread_monotone_in_volatility() {
        let model = SpreadModel::default();
        let mut last = 0.0;
        for i in 0..50 {
            let vol = i as f64 * 0.01;
            let quote = model.spread(vol, 1_000_000.0, 1_000_000.0);
            assert!(quote.spread_pct >= last);
            assert!(quote.spread_pct <= MAX_SPREAD_PCT);
            last = quote.spread_pct;
        }
    }

    #[test]
    fn execution_price_straddles_mid() {
        let model = SpreadModel::default();
        let spread = 0.0002;
        let buy = model.execution_price(66_000.0, Side::Buy, spread);
        let sell = model.execution_price(66_000.0, Side::Sell, spread);
        assert!(buy > 66_000.0);
        assert!(sell < 66_000.0);
        assert!((buy - 66_000.0 * 1.0001).abs() < 1e-6);
        assert!((sell - 66_000.0 * 0.9999).abs() < 1e-6);
    }

    #[test]
    fn execution_price_zero_spread_is_mid() {
        let model = SpreadModel::default();
        assert_eq!(model.execution_price(123.45, Side::Buy, 0.0), 123.45);
        assert_eq!(model.execution_price(123.45, Side::Sell, 0.0), 123.45);
    }
}
