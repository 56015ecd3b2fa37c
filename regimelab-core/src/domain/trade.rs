//! ClosedTrade: one completed round trip in the append-only trade log.

use super::position::PositionSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a position closed.
///
/// There is no other exit path: no end-of-data close, no manual exit. A
/// position still open when the bar sequence ends is reported on the run
/// result, not logged as a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

/// A completed round-trip trade, appended exactly once per position closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub side: PositionSide,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    /// Net PnL after commission on both legs.
    pub pnl: f64,
    /// Net PnL as a percentage of entry notional (2.5 = +2.5%).
    pub pnl_pct: f64,
    /// Total commission charged across entry and exit.
    pub commission: f64,
    pub exit_reason: ExitReason,
    /// Signal confidence at entry, normalized to [0, 1].
    pub confidence_at_entry: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade(pnl: f64) -> ClosedTrade {
        ClosedTrade {
            side: PositionSide::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            exit_time: Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_price: 104.0,
            size: 2.0,
            pnl,
            pnl_pct: pnl / 200.0 * 100.0,
            commission: 0.4,
            exit_reason: ExitReason::TakeProfit,
            confidence_at_entry: 0.72,
        }
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade(7.6).is_winner());
        assert!(!sample_trade(-3.0).is_winner());
        assert!(!sample_trade(0.0).is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade(7.6);
        let json = serde_json::to_string(&trade).unwrap();
        let deser: ClosedTrade = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.exit_reason, ExitReason::TakeProfit);
        assert_eq!(deser.pnl, trade.pnl);
        assert_eq!(deser.confidence_at_entry, 0.72);
    }
}
