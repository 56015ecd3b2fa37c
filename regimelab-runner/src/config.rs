//! TOML run configuration.
//!
//! Every field has a serde default so a minimal config is just a symbol:
//!
//! ```toml
//! [backtest]
//! symbol = "BTC-USD"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use regimelab_core::engine::SimConfig;
use regimelab_core::regime::RegimeDetector;
use regimelab_core::spread::SpreadModel;

/// Errors from configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete runner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub detector: DetectorSection,
    #[serde(default)]
    pub spread: SpreadSection,
    #[serde(default)]
    pub calibration: CalibrationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default)]
    pub model_costs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSection {
    #[serde(default = "default_vol_lookback")]
    pub vol_lookback: usize,
    #[serde(default = "default_trend_fast")]
    pub trend_fast: usize,
    #[serde(default = "default_trend_slow")]
    pub trend_slow: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadSection {
    #[serde(default = "default_base_spread_pct")]
    pub base_spread_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSection {
    #[serde(default = "default_confidence_thresholds")]
    pub confidence_thresholds: Vec<f64>,
    #[serde(default = "default_movement_thresholds")]
    pub movement_thresholds: Vec<f64>,
    #[serde(default = "default_min_trades")]
    pub min_trades: usize,
}

fn default_symbol() -> String {
    "BTC-USD".to_string()
}
fn default_initial_capital() -> f64 {
    10_000.0
}
fn default_warmup_bars() -> usize {
    100
}
fn default_commission_rate() -> f64 {
    0.001
}
fn default_vol_lookback() -> usize {
    20
}
fn default_trend_fast() -> usize {
    20
}
fn default_trend_slow() -> usize {
    50
}
fn default_base_spread_pct() -> f64 {
    0.0001
}
fn default_confidence_thresholds() -> Vec<f64> {
    vec![0.60, 0.65, 0.70, 0.72, 0.75, 0.78, 0.80]
}
fn default_movement_thresholds() -> Vec<f64> {
    vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]
}
fn default_min_trades() -> usize {
    regimelab_core::calibrate::DEFAULT_MIN_TRADES
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            initial_capital: default_initial_capital(),
            warmup_bars: default_warmup_bars(),
            commission_rate: default_commission_rate(),
            model_costs: false,
        }
    }
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            vol_lookback: default_vol_lookback(),
            trend_fast: default_trend_fast(),
            trend_slow: default_trend_slow(),
        }
    }
}

impl Default for SpreadSection {
    fn default() -> Self {
        Self {
            base_spread_pct: default_base_spread_pct(),
        }
    }
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            confidence_thresholds: default_confidence_thresholds(),
            movement_thresholds: default_movement_thresholds(),
            min_trades: default_min_trades(),
        }
    }
}

impl RunnerConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(
                "initial_capital must be positive".into(),
            ));
        }
        if self.backtest.commission_rate < 0.0 {
            return Err(ConfigError::Invalid(
                "commission_rate must be non-negative".into(),
            ));
        }
        if self.spread.base_spread_pct <= 0.0 {
            return Err(ConfigError::Invalid(
                "base_spread_pct must be positive".into(),
            ));
        }
        if self.detector.trend_slow < self.detector.trend_fast {
            return Err(ConfigError::Invalid(
                "trend_slow must be >= trend_fast".into(),
            ));
        }
        Ok(())
    }

    /// Build the core collaborators this config describes.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.backtest.initial_capital, self.backtest.warmup_bars)
            .with_costs(self.backtest.commission_rate, self.backtest.model_costs)
    }

    pub fn detector(&self) -> RegimeDetector {
        RegimeDetector::new(
            self.detector.vol_lookback,
            self.detector.trend_fast,
            self.detector.trend_slow,
        )
    }

    pub fn spread_model(&self) -> SpreadModel {
        SpreadModel::new(self.spread.base_spread_pct)
    }
}
