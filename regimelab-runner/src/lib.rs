//! RegimeLab Runner: backtest orchestration over the core engine.
//!
//! This crate builds on `regimelab-core` to provide:
//! - CSV bar loading with integrity validation and content hashing
//! - Single-run execution with summary metrics and timing
//! - Parallel multi-symbol fan-out (one run per rayon worker)
//! - Threshold-calibration reporting over the trade log
//! - TOML configuration with per-field defaults
//! - JSON/CSV artifact export with schema versioning
//! - A deterministic reference signal generator for demos and tests

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod signal_gen;
pub mod summary;

pub use config::{ConfigError, RunnerConfig};
pub use data_loader::{load_bars_csv, parse_bars, LoadError, LoadedBars};
pub use export::{export_json, export_trades_csv, import_json};
pub use metrics::{max_drawdown, profit_factor, total_return, win_rate};
pub use signal_gen::MomentumCrossGenerator;
pub use summary::{run_symbol, run_universe, BacktestReport, RunError, RunSummary, SCHEMA_VERSION};
