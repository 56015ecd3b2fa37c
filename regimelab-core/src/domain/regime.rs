//! Market regime classification types.
//!
//! Regime categories are closed tagged enums, not open strings, so the
//! multiplier composition in the detector is exhaustive and statically
//! checkable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short-window volatility relative to the long 252-period baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

/// Fast/slow moving-average trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendRegime {
    TrendingUp,
    Ranging,
    TrendingDown,
}

/// Current volume relative to its trailing 24-period average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidityRegime {
    High,
    Normal,
    Low,
}

/// Trading-parameter multipliers derived from a regime classification.
///
/// `position_size` and `stop_loss` compose multiplicatively across the
/// detector's adjustment passes; `confidence_threshold` is assigned by the
/// last pass that triggers (volatility, then trend, then liquidity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeMultipliers {
    pub position_size: f64,
    pub confidence_threshold: f64,
    pub stop_loss: f64,
}

impl Default for RegimeMultipliers {
    fn default() -> Self {
        Self {
            position_size: 1.0,
            confidence_threshold: 0.6,
            stop_loss: 1.0,
        }
    }
}

/// Complete market regime state at one point in time.
///
/// Recomputed fresh every step; never mutated, only replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeState {
    pub volatility: VolatilityRegime,
    pub trend: TrendRegime,
    pub liquidity: LiquidityRegime,
    /// Scaling applied to base position size. Always strictly positive.
    pub position_size_multiplier: f64,
    /// Minimum normalized signal confidence required to trade, in [0, 1].
    pub confidence_threshold: f64,
    pub timestamp: DateTime<Utc>,
}
