//! Position: the single open holding of a simulation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1.0 for longs, -1.0 for shorts. Used in PnL arithmetic.
    pub fn direction_sign(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

/// An open position, created atomically on entry and immutable until closed.
///
/// At most one instance is live per simulation run. Stop and target levels
/// are captured verbatim from the entry decision; the position itself never
/// adjusts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,
    pub entry_time: DateTime<Utc>,
}

impl Position {
    /// Notional value at entry.
    pub fn entry_notional(&self) -> f64 {
        self.entry_price * self.size
    }
}
