//! Reporting and export: JSON and CSV artifact generation.
//!
//! Two export formats for run results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the trade tape for external analysis tools
//!
//! Persisted reports include a `schema_version` field. Unknown versions
//! are rejected on load.

use anyhow::{bail, Context, Result};

use regimelab_core::domain::ClosedTrade;

use crate::summary::{BacktestReport, SCHEMA_VERSION};

// ── JSON export ─────────────────────────────────────────────────────

/// Serialize a `BacktestReport` to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport` from JSON, rejecting unknown schema
/// versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ── CSV export ──────────────────────────────────────────────────────

/// Export the trade log as CSV.
///
/// Columns: side, entry_time, exit_time, entry_price, exit_price, size,
/// pnl, pnl_pct, commission, exit_reason, confidence_at_entry
pub fn export_trades_csv(trades: &[ClosedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "size",
        "pnl",
        "pnl_pct",
        "commission",
        "exit_reason",
        "confidence_at_entry",
    ])?;

    for t in trades {
        wtr.write_record([
            format!("{:?}", t.side),
            t.entry_time.to_rfc3339(),
            t.exit_time.to_rfc3339(),
            format!("{:.6}", t.entry_price),
            format!("{:.6}", t.exit_price),
            format!("{:.8}", t.size),
            format!("{:.6}", t.pnl),
            format!("{:.4}", t.pnl_pct),
            format!("{:.6}", t.commission),
            format!("{:?}", t.exit_reason),
            format!("{:.4}", t.confidence_at_entry),
        ])?;
    }

    let bytes = wtr.into_inner().context("csv writer flush failed")?;
    String::from_utf8(bytes).context("csv output was not valid utf-8")
}
