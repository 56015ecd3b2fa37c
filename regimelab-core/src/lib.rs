//! RegimeLab Core: regime-adaptive backtest simulation and execution costs.
//!
//! This crate contains the heart of the backtest engine:
//! - Domain types (bars, positions, closed trades, regime states)
//! - RegimeDetector: volatility/trend/liquidity classification with
//!   fixed-order risk-multiplier composition
//! - SpreadModel: dynamic execution-cost spread and realistic fill prices
//! - Position simulator: a single-position Flat/Open state machine over a
//!   bar sequence with one-bar exit lookahead
//! - Threshold calibrator: post-hoc scans of the closed-trade log
//!
//! The signal source is an external collaborator behind the
//! `signal::SignalGenerator` trait; the core treats its output as untrusted
//! input. Detector and spread model are pure services with no retained
//! state, so independent simulation runs can execute in parallel without
//! locking.

pub mod calibrate;
pub mod domain;
pub mod engine;
pub mod regime;
pub mod signal;
pub mod spread;
pub mod stats;
pub mod synthetic;

pub use calibrate::{best_threshold, CalibrationRow, JointRow, DEFAULT_MIN_TRADES};
pub use domain::{
    ClosedTrade, ExitReason, LiquidityRegime, Position, PositionSide, PriceBar,
    RegimeMultipliers, RegimeState, TrendRegime, VolatilityRegime,
};
pub use engine::{run_simulation, SimConfig, SimError, SimResult};
pub use regime::{DetectError, RegimeDetector};
pub use signal::{SignalAction, SignalGenerator, TradeDecision};
pub use spread::{Side, SpreadModel, SpreadQuote};
