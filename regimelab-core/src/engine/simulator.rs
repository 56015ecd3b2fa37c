//! Bar-by-bar position simulator: the heart of the backtest core.
//!
//! A two-state machine (Flat / Open) driven once per bar index:
//! - Flat: classify the regime over the trailing window, consult the
//!   external signal generator, and open a position when the normalized
//!   confidence clears the regime's threshold.
//! - Open: resolve the position against the next bar's high/low range,
//!   stop-loss checked before take-profit.
//!
//! The exit check requires indexed lookahead to bar i+1, so the loop runs
//! over a random-access slice and terminates one bar early: the final bar
//! never opens a position because no bar exists to resolve its exit.

use thiserror::Error;

use crate::domain::{ClosedTrade, ExitReason, Position, PositionSide, PriceBar};
use crate::regime::{DetectError, RegimeDetector, LIQUIDITY_WINDOW};
use crate::signal::{sanitize, SignalAction, SignalGenerator};
use crate::spread::{Side, SpreadModel};
use crate::stats::{mean, pct_change, sample_std, trailing};

use super::config::SimConfig;

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed bar feed: non-finite price, negative volume, or a
    /// non-increasing timestamp. Bars are assumed validated upstream
    /// otherwise.
    #[error("data integrity violation at bar {index}: {reason}")]
    DataIntegrity { index: usize, reason: String },
}

/// The simulator's position state machine.
#[derive(Debug, Clone)]
enum PositionState {
    Flat,
    Open {
        position: Position,
        /// Normalized entry confidence, carried into the ClosedTrade.
        confidence: f64,
    },
}

/// Result of a complete simulation run.
#[derive(Debug, Clone)]
pub struct SimResult {
    /// Completed round-trip trades, in closure order.
    pub trades: Vec<ClosedTrade>,
    /// Equity at each bar; changes only at position closure.
    pub equity_curve: Vec<f64>,
    pub final_equity: f64,
    /// A position still held when bars ran out. Never logged as a trade.
    pub open_position: Option<Position>,
    /// Decisions requested from the generator.
    pub signal_count: usize,
    /// Steps skipped because the regime windows were not yet populated.
    pub skipped_insufficient_history: usize,
    /// Untrusted-input coercions and other non-fatal conditions.
    pub warnings: Vec<String>,
}

/// Run a simulation over a bar sequence.
///
/// The detector and spread model are pure services; the generator is the
/// opaque external collaborator. All three are borrowed, so callers may
/// share instances across parallel runs.
pub fn run_simulation(
    bars: &[PriceBar],
    generator: &dyn SignalGenerator,
    detector: &RegimeDetector,
    spread_model: &SpreadModel,
    config: &SimConfig,
) -> Result<SimResult, SimError> {
    let n = bars.len();

    // Precompute the series the regime windows slice into.
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let returns = pct_change(&closes);

    let mut state = PositionState::Flat;
    let mut trades: Vec<ClosedTrade> = Vec::new();
    let mut equity = config.initial_capital;
    let mut equity_curve = Vec::with_capacity(n);
    let mut warnings = Vec::new();
    let mut signal_count = 0usize;
    let mut skipped_insufficient_history = 0usize;

    for i in 0..n {
        let bar = &bars[i];
        if let Some(reason) = bar.malformed_reason() {
            return Err(SimError::DataIntegrity {
                index: i,
                reason: reason.to_string(),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(SimError::DataIntegrity {
                index: i,
                reason: "non-increasing timestamp".to_string(),
            });
        }

        // Transitions run after warm-up, and never on the final bar.
        if i >= config.warmup_bars && i + 1 < n {
            state = match state {
                PositionState::Flat => {
                    // Returns lag bars by one: the window ending at bar i
                    // holds i return observations.
                    match detector.detect(
                        &closes[..=i],
                        &returns[..i],
                        &volumes[..=i],
                        bar.timestamp,
                    ) {
                        Ok(regime) => {
                            signal_count += 1;
                            let (decision, warning) =
                                sanitize(generator.evaluate(&bars[..=i], equity));
                            if let Some(w) = warning {
                                warnings.push(format!("bar {i}: {w}"));
                            }

                            let side = match decision.action {
                                SignalAction::Buy => Some(PositionSide::Long),
                                SignalAction::Sell => Some(PositionSide::Short),
                                SignalAction::Hold => None,
                            };
                            let confidence = decision.confidence / 100.0;

                            match side {
                                Some(side) if confidence >= regime.confidence_threshold => {
                                    let entry_price = if config.model_costs {
                                        entry_with_costs(
                                            bar,
                                            side,
                                            &returns[..i],
                                            &volumes[..=i],
                                            detector,
                                            spread_model,
                                        )
                                    } else {
                                        bar.close
                                    };
                                    PositionState::Open {
                                        position: Position {
                                            side,
                                            entry_price,
                                            stop_loss: decision.stop_loss,
                                            take_profit: decision.take_profit,
                                            size: decision.position_size,
                                            entry_time: bar.timestamp,
                                        },
                                        confidence,
                                    }
                                }
                                _ => PositionState::Flat,
                            }
                        }
                        Err(DetectError::InsufficientHistory { .. }) => {
                            // Expected until the long volatility window
                            // fills; skip the step, never surface as failure.
                            skipped_insufficient_history += 1;
                            PositionState::Flat
                        }
                    }
                }
                PositionState::Open {
                    position,
                    confidence,
                } => {
                    let next = &bars[i + 1];
                    match exit_trigger(&position, next) {
                        Some((exit_price, exit_reason)) => {
                            let trade = close_position(
                                &position,
                                exit_price,
                                exit_reason,
                                next.timestamp,
                                confidence,
                                config.commission_rate,
                            );
                            equity += trade.pnl;
                            trades.push(trade);
                            PositionState::Flat
                        }
                        None => PositionState::Open {
                            position,
                            confidence,
                        },
                    }
                }
            };
        }

        equity_curve.push(equity);
    }

    let open_position = match state {
        PositionState::Open { position, .. } => Some(position),
        PositionState::Flat => None,
    };

    Ok(SimResult {
        trades,
        equity_curve,
        final_equity: equity,
        open_position,
        signal_count,
        skipped_insufficient_history,
        warnings,
    })
}

/// Check the next bar's range against the position's levels.
///
/// Stop-loss before take-profit: when one bar touches both, the stop wins
/// by fixed precedence. Short positions mirror the inequalities.
fn exit_trigger(position: &Position, next: &PriceBar) -> Option<(f64, ExitReason)> {
    match position.side {
        PositionSide::Long => {
            if next.low <= position.stop_loss {
                Some((position.stop_loss, ExitReason::StopLoss))
            } else if next.high >= position.take_profit {
                Some((position.take_profit, ExitReason::TakeProfit))
            } else {
                None
            }
        }
        PositionSide::Short => {
            if next.high >= position.stop_loss {
                Some((position.stop_loss, ExitReason::StopLoss))
            } else if next.low <= position.take_profit {
                Some((position.take_profit, ExitReason::TakeProfit))
            } else {
                None
            }
        }
    }
}

/// Realize a closure into a ClosedTrade. Commission is charged on both legs.
fn close_position(
    position: &Position,
    exit_price: f64,
    exit_reason: ExitReason,
    exit_time: chrono::DateTime<chrono::Utc>,
    confidence: f64,
    commission_rate: f64,
) -> ClosedTrade {
    let gross =
        (exit_price - position.entry_price) * position.size * position.side.direction_sign();
    let commission =
        commission_rate * (position.entry_notional() + exit_price * position.size);
    let pnl = gross - commission;
    let notional = position.entry_notional();
    let pnl_pct = if notional != 0.0 {
        pnl / notional * 100.0
    } else {
        0.0
    };

    ClosedTrade {
        side: position.side,
        entry_time: position.entry_time,
        exit_time,
        entry_price: position.entry_price,
        exit_price,
        size: position.size,
        pnl,
        pnl_pct,
        commission,
        exit_reason,
        confidence_at_entry: confidence,
    }
}

/// Spread-adjusted entry price: volatility from the trailing short return
/// window, average volume from the trailing liquidity window.
fn entry_with_costs(
    bar: &PriceBar,
    side: PositionSide,
    returns: &[f64],
    volumes: &[f64],
    detector: &RegimeDetector,
    spread_model: &SpreadModel,
) -> f64 {
    let volatility = sample_std(trailing(returns, detector.vol_lookback()).unwrap_or(returns));
    let avg_volume = mean(trailing(volumes, LIQUIDITY_WINDOW).unwrap_or(volumes));
    let quote = spread_model.spread(volatility, bar.volume, avg_volume);
    let exec_side = match side {
        PositionSide::Long => Side::Buy,
        PositionSide::Short => Side::Sell,
    };
    spread_model.execution_price(bar.close, exec_side, quote.spread_pct)
}
