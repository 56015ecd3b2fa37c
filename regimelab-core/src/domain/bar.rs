//! PriceBar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over a fixed interval.
///
/// Bars are supplied externally with strictly increasing timestamps. The
/// simulator tolerates gaps, but rolling-window statistics assume roughly
/// uniform spacing (hourly or daily).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Returns `Some(reason)` if the bar violates data integrity:
    /// any non-finite OHLC field, or a non-finite or negative volume.
    pub fn malformed_reason(&self) -> Option<&'static str> {
        if !self.open.is_finite()
            || !self.high.is_finite()
            || !self.low.is_finite()
            || !self.close.is_finite()
        {
            return Some("non-finite price field");
        }
        if !self.volume.is_finite() {
            return Some("non-finite volume");
        }
        if self.volume < 0.0 {
            return Some("negative volume");
        }
        None
    }

    /// Basic OHLC range sanity: high is the top of the bar, low the bottom.
    pub fn is_sane(&self) -> bool {
        if self.malformed_reason().is_some() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
