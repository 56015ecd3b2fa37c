//! Threshold calibration: post-hoc scans over a closed-trade log.
//!
//! Every function here is pure: trade slice in, derived rows out. Rows are
//! recomputed per query and never persisted as mutable state.

use serde::{Deserialize, Serialize};

use crate::domain::ClosedTrade;

/// Minimum qualifying trades before a candidate threshold may be selected
/// as "best". Guards against overfitting to small, noisy subsets.
pub const DEFAULT_MIN_TRADES: usize = 5;

/// Aggregate statistics for one subset of the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    pub threshold: f64,
    pub trade_count: usize,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    /// Fraction of trades in the subset with pnl > 0.
    pub win_rate: f64,
}

/// One cell of the confidence x movement cross-product scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRow {
    pub confidence_threshold: f64,
    pub movement_threshold: f64,
    pub trade_count: usize,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub win_rate: f64,
}

fn stats_over<'a>(threshold: f64, trades: impl Iterator<Item = &'a ClosedTrade>) -> CalibrationRow {
    let mut trade_count = 0usize;
    let mut total_pnl = 0.0;
    let mut winners = 0usize;
    for trade in trades {
        trade_count += 1;
        total_pnl += trade.pnl;
        if trade.is_winner() {
            winners += 1;
        }
    }
    let avg_pnl = if trade_count > 0 {
        total_pnl / trade_count as f64
    } else {
        0.0
    };
    let win_rate = if trade_count > 0 {
        winners as f64 / trade_count as f64
    } else {
        0.0
    };
    CalibrationRow {
        threshold,
        trade_count,
        total_pnl,
        avg_pnl,
        win_rate,
    }
}

/// Partition the log by entry confidence: rows for the `>= threshold` and
/// `< threshold` subsets, in that order.
pub fn confidence_split(
    trades: &[ClosedTrade],
    threshold: f64,
) -> (CalibrationRow, CalibrationRow) {
    let above = stats_over(
        threshold,
        trades.iter().filter(|t| t.confidence_at_entry >= threshold),
    );
    let below = stats_over(
        threshold,
        trades.iter().filter(|t| t.confidence_at_entry < threshold),
    );
    (above, below)
}

/// The `>= threshold` row for each candidate confidence threshold.
pub fn confidence_scan(trades: &[ClosedTrade], thresholds: &[f64]) -> Vec<CalibrationRow> {
    thresholds
        .iter()
        .map(|&threshold| confidence_split(trades, threshold).0)
        .collect()
}

/// The `|pnl_pct| >= threshold` row for each candidate movement threshold.
pub fn movement_scan(trades: &[ClosedTrade], thresholds: &[f64]) -> Vec<CalibrationRow> {
    thresholds
        .iter()
        .map(|&threshold| {
            stats_over(
                threshold,
                trades.iter().filter(|t| t.pnl_pct.abs() >= threshold),
            )
        })
        .collect()
}

/// Full cross-product of confidence and movement thresholds.
pub fn joint_scan(
    trades: &[ClosedTrade],
    confidence_thresholds: &[f64],
    movement_thresholds: &[f64],
) -> Vec<JointRow> {
    let mut rows = Vec::with_capacity(confidence_thresholds.len() * movement_thresholds.len());
    for &conf in confidence_thresholds {
        for &movement in movement_thresholds {
            let stats = stats_over(
                conf,
                trades.iter().filter(|t| {
                    t.confidence_at_entry >= conf && t.pnl_pct.abs() >= movement
                }),
            );
            rows.push(JointRow {
                confidence_threshold: conf,
                movement_threshold: movement,
                trade_count: stats.trade_count,
                total_pnl: stats.total_pnl,
                avg_pnl: stats.avg_pnl,
                win_rate: stats.win_rate,
            });
        }
    }
    rows
}

/// The best operating point: maximum total PnL among rows whose subset has
/// at least `min_trades` trades. Rows below the guard are excluded entirely,
/// even when nominally more profitable.
pub fn best_threshold(rows: &[CalibrationRow], min_trades: usize) -> Option<&CalibrationRow> {
    rows.iter()
        .filter(|row| row.trade_count >= min_trades)
        .max_by(|a, b| {
            a.total_pnl
                .partial_cmp(&b.total_pnl)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
