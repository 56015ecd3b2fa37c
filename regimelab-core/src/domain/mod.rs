//! Domain types for the regime-adaptive backtest core.

pub mod bar;
pub mod position;
pub mod regime;
pub mod trade;

pub use bar::PriceBar;
pub use position::{Position, PositionSide};
pub use regime::{
    LiquidityRegime, RegimeMultipliers, RegimeState, TrendRegime, VolatilityRegime,
};
pub use trade::{ClosedTrade, ExitReason};
