//! RegimeDetector: classifies volatility, trend, and liquidity from rolling
//! windows and derives risk multipliers.
//!
//! The detector is an explicitly constructed, side-effect-free service: it
//! holds only its lookback parameters and retains no state between calls, so
//! independent simulation runs can share one instance or construct their own
//! without locking.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    LiquidityRegime, RegimeMultipliers, RegimeState, TrendRegime, VolatilityRegime,
};
use crate::stats::{mean, sample_std, trailing};

/// Long-horizon volatility baseline window (one trading year of bars).
pub const LONG_VOL_WINDOW: usize = 252;

/// Trailing volume window for liquidity classification.
pub const LIQUIDITY_WINDOW: usize = 24;

/// Minimum fast/slow SMA divergence that counts as a trend.
const TREND_STRENGTH_MIN: f64 = 0.02;

/// Errors from regime classification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    /// The rolling window is not yet fully populated. Expected during
    /// warm-up; callers skip the step rather than aborting.
    #[error("insufficient history: need {required} samples, have {available}")]
    InsufficientHistory { required: usize, available: usize },
}

/// Stateless market regime classifier.
#[derive(Debug, Clone)]
pub struct RegimeDetector {
    vol_lookback: usize,
    trend_fast: usize,
    trend_slow: usize,
}

impl Default for RegimeDetector {
    fn default() -> Self {
        Self::new(20, 20, 50)
    }
}

impl RegimeDetector {
    pub fn new(vol_lookback: usize, trend_fast: usize, trend_slow: usize) -> Self {
        assert!(vol_lookback >= 2, "vol_lookback must be >= 2");
        assert!(trend_fast >= 1, "trend_fast must be >= 1");
        assert!(trend_slow >= trend_fast, "trend_slow must be >= trend_fast");
        Self {
            vol_lookback,
            trend_fast,
            trend_slow,
        }
    }

    pub fn vol_lookback(&self) -> usize {
        self.vol_lookback
    }

    /// Bars of history needed before `detect()` can succeed: the long
    /// volatility window plus one, since returns lag prices by one sample.
    pub fn required_history(&self) -> usize {
        LONG_VOL_WINDOW + 1
    }

    // ── Classifiers ─────────────────────────────────────────────────────

    /// Short-window vs. long-window return volatility at the latest index.
    ///
    /// High if short >= 1.5x long, Low if short <= 0.5x long, else Normal.
    /// Both windows must be fully populated: at least 252 + 1 return
    /// observations are required.
    pub fn classify_volatility(&self, returns: &[f64]) -> Result<VolatilityRegime, DetectError> {
        let required = LONG_VOL_WINDOW + 1;
        if returns.len() < required {
            return Err(DetectError::InsufficientHistory {
                required,
                available: returns.len(),
            });
        }
        // A lookback longer than the available history falls back to the
        // full series; the precondition above bounds how short that can be.
        let current_vol = sample_std(trailing(returns, self.vol_lookback).unwrap_or(returns));
        let historical_vol = sample_std(&returns[returns.len() - LONG_VOL_WINDOW..]);

        Ok(if current_vol >= historical_vol * 1.5 {
            VolatilityRegime::High
        } else if current_vol <= historical_vol * 0.5 {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        })
    }

    /// Fast/slow SMA trend at the latest index.
    ///
    /// A slow average of exactly zero yields Ranging: the degenerate-safe
    /// default, not an error.
    pub fn classify_trend(&self, prices: &[f64]) -> Result<TrendRegime, DetectError> {
        let slow_window =
            trailing(prices, self.trend_slow).ok_or(DetectError::InsufficientHistory {
                required: self.trend_slow,
                available: prices.len(),
            })?;
        let fast_window = trailing(prices, self.trend_fast).unwrap_or(prices);

        let sma_fast = mean(fast_window);
        let sma_slow = mean(slow_window);
        if sma_slow == 0.0 {
            return Ok(TrendRegime::Ranging);
        }

        let trend_strength = (sma_fast - sma_slow).abs() / sma_slow;
        Ok(if sma_fast > sma_slow && trend_strength > TREND_STRENGTH_MIN {
            TrendRegime::TrendingUp
        } else if sma_fast < sma_slow && trend_strength > TREND_STRENGTH_MIN {
            TrendRegime::TrendingDown
        } else {
            TrendRegime::Ranging
        })
    }

    /// Latest volume vs. its trailing 24-period mean.
    ///
    /// High if current >= 1.5x average, Low if current <= 0.5x average.
    pub fn classify_liquidity(&self, volumes: &[f64]) -> Result<LiquidityRegime, DetectError> {
        let window =
            trailing(volumes, LIQUIDITY_WINDOW).ok_or(DetectError::InsufficientHistory {
                required: LIQUIDITY_WINDOW,
                available: volumes.len(),
            })?;
        let current = *volumes.last().expect("window check guarantees non-empty");
        let average = mean(window);

        Ok(if current >= average * 1.5 {
            LiquidityRegime::High
        } else if current <= average * 0.5 {
            LiquidityRegime::Low
        } else {
            LiquidityRegime::Normal
        })
    }

    // ── Multipliers ─────────────────────────────────────────────────────

    /// Derive trading-parameter multipliers from a classification.
    ///
    /// Three adjustment passes run in a fixed order: volatility, then trend,
    /// then liquidity. Size and stop multipliers compose multiplicatively;
    /// the confidence threshold is assigned, so the last triggering pass
    /// wins. The order is a contract: a low-liquidity threshold of 0.8
    /// overrides whatever volatility and trend assigned before it.
    pub fn multipliers_for(
        &self,
        volatility: VolatilityRegime,
        trend: TrendRegime,
        liquidity: LiquidityRegime,
    ) -> RegimeMultipliers {
        let mut m = RegimeMultipliers::default();

        match volatility {
            VolatilityRegime::High => {
                m.position_size *= 0.5;
                m.confidence_threshold = 0.75;
                m.stop_loss *= 1.5;
            }
            VolatilityRegime::Low => {
                m.position_size *= 1.2;
                m.confidence_threshold = 0.5;
            }
            VolatilityRegime::Normal => {}
        }

        match trend {
            TrendRegime::Ranging => {
                m.position_size *= 0.8;
                m.confidence_threshold = 0.7;
            }
            TrendRegime::TrendingUp | TrendRegime::TrendingDown => {
                m.position_size *= 1.2;
            }
        }

        if liquidity == LiquidityRegime::Low {
            m.position_size *= 0.6;
            m.confidence_threshold = 0.8;
        }

        m
    }

    /// Compose the three classifiers and the multiplier pass into one
    /// regime state, timestamped from the latest price sample.
    pub fn detect(
        &self,
        prices: &[f64],
        returns: &[f64],
        volumes: &[f64],
        timestamp: DateTime<Utc>,
    ) -> Result<RegimeState, DetectError> {
        let volatility = self.classify_volatility(returns)?;
        let trend = self.classify_trend(prices)?;
        let liquidity = self.classify_liquidity(volumes)?;
        let multipliers = self.multipliers_for(volatility, trend, liquidity);

        Ok(RegimeState {
            volatility,
            trend,
            liquidity,
            position_size_multiplier: multipliers.position_size,
            confidence_threshold: multipliers.confidence_threshold,
            timestamp,
        })
    }
}
