//! CSV bar ingestion.
//!
//! Expected columns, with header: `timestamp,open,high,low,close,volume`.
//! Timestamps are RFC 3339. Bars must arrive in strictly increasing
//! timestamp order; the loader rejects files that violate it rather than
//! sorting silently.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use regimelab_core::domain::PriceBar;

/// Errors from bar loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record}: {reason}")]
    Record { record: usize, reason: String },
    #[error("no bars in input")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Loaded bar series plus a content hash for reproducibility tracking.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<PriceBar>,
    /// blake3 hex digest of the raw file bytes.
    pub dataset_hash: String,
}

/// Load bars from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<LoadedBars, LoadError> {
    let raw = std::fs::read(path)?;
    let dataset_hash = blake3::hash(&raw).to_hex().to_string();
    let bars = parse_bars(&raw)?;
    Ok(LoadedBars { bars, dataset_hash })
}

/// Parse bars from raw CSV bytes. Separated from the file read so tests
/// and other transports can reuse it.
pub fn parse_bars(raw: &[u8]) -> Result<Vec<PriceBar>, LoadError> {
    let mut reader = csv::Reader::from_reader(raw);
    let mut bars: Vec<PriceBar> = Vec::new();

    for (i, record) in reader.deserialize::<BarRecord>().enumerate() {
        let record = record?;
        let bar = PriceBar {
            timestamp: record.timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };
        if let Some(reason) = bar.malformed_reason() {
            return Err(LoadError::Record {
                record: i,
                reason: reason.to_string(),
            });
        }
        if let Some(prev) = bars.last() {
            if bar.timestamp <= prev.timestamp {
                return Err(LoadError::Record {
                    record: i,
                    reason: format!(
                        "timestamp {} does not increase past {}",
                        bar.timestamp, prev.timestamp
                    ),
                });
            }
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(bars)
}

/// Serialize bars to CSV in the loader's own format.
pub fn bars_to_csv(bars: &[PriceBar]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp.to_rfc3339(),
            format!("{:.8}", bar.open),
            format!("{:.8}", bar.high),
            format!("{:.8}", bar.low),
            format!("{:.8}", bar.close),
            format!("{:.2}", bar.volume),
        ])?;
    }
    let bytes = wtr.into_inner().expect("in-memory writer cannot fail");
    Ok(String::from_utf8(bytes).expect("csv output is valid utf-8"))
}
