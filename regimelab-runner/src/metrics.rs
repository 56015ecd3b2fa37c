//! Performance metrics: pure functions over equity curves and trade logs.
//!
//! Every metric is a pure function: equity curve and/or trade list in,
//! scalar out. No dependencies on the runner or the engine loop.

use regimelab_core::domain::ClosedTrade;

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let final_eq = *equity_curve.last().unwrap();
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl > 0.0)
        .map(|t| t.pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
