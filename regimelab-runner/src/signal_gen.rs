//! Reference signal generator.
//!
//! A deterministic moving-average momentum source used by the CLI and the
//! integration tests. The core stays agnostic: this is just one
//! implementation of the `SignalGenerator` contract, standing in for
//! whatever external model produces decisions in production.

use regimelab_core::domain::PriceBar;
use regimelab_core::signal::{SignalAction, SignalGenerator, TradeDecision};
use regimelab_core::stats::{mean, pct_change, sample_std, trailing};

/// SMA crossover with volatility-scaled stops.
///
/// Buy when SMA(fast) > SMA(slow) * 1.01, sell when SMA(fast) <
/// SMA(slow) * 0.99, hold in between. Confidence is 70 for directional
/// calls and 40 for holds, on the generator's native 0-100 scale. Stops
/// sit two trailing-volatility units from the close, targets three (a
/// fixed 1.5 reward-to-risk), and sizing risks a tenth of the balance.
#[derive(Debug, Clone)]
pub struct MomentumCrossGenerator {
    fast: usize,
    slow: usize,
}

impl Default for MomentumCrossGenerator {
    fn default() -> Self {
        Self::new(20, 50)
    }
}

impl MomentumCrossGenerator {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1, "fast must be >= 1");
        assert!(slow >= fast, "slow must be >= fast");
        Self { fast, slow }
    }
}

impl SignalGenerator for MomentumCrossGenerator {
    fn name(&self) -> &str {
        "momentum_cross"
    }

    fn evaluate(&self, bars: &[PriceBar], account_balance: f64) -> TradeDecision {
        if bars.len() < self.slow + 1 {
            return TradeDecision::hold();
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let close = *closes.last().unwrap();
        let sma_fast = mean(trailing(&closes, self.fast).unwrap_or(&closes));
        let sma_slow = mean(trailing(&closes, self.slow).unwrap_or(&closes));

        let action = if sma_fast > sma_slow * 1.01 {
            SignalAction::Buy
        } else if sma_fast < sma_slow * 0.99 {
            SignalAction::Sell
        } else {
            return TradeDecision {
                action: SignalAction::Hold,
                confidence: 40.0,
                stop_loss: 0.0,
                take_profit: 0.0,
                position_size: 0.0,
                entry_price: close,
            };
        };

        // Stop distance from trailing return volatility, floored so a dead
        // series still yields usable levels.
        let returns = pct_change(&closes);
        let volatility = sample_std(trailing(&returns, self.fast).unwrap_or(&returns)).max(0.001);
        let stop_distance = close * volatility * 2.0;
        let target_distance = close * volatility * 3.0;

        let (stop_loss, take_profit) = match action {
            SignalAction::Buy => (close - stop_distance, close + target_distance),
            SignalAction::Sell => (close + stop_distance, close - target_distance),
            SignalAction::Hold => unreachable!(),
        };

        TradeDecision {
            action,
            confidence: 70.0,
            stop_loss,
            take_profit,
            position_size: (account_balance * 0.1) / close,
            entry_price: close,
        }
    }
}
