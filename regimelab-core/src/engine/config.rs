//! Simulation configuration.

/// Configuration for a single simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub initial_capital: f64,
    /// Bars skipped before the first transition is evaluated, so the
    /// regime windows and the external generator have history to work with.
    pub warmup_bars: usize,
    /// Commission charged as `rate * notional` on each leg (entry and exit).
    pub commission_rate: f64,
    /// When set, entries fill at the spread-adjusted execution price
    /// instead of the raw bar close.
    pub model_costs: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            warmup_bars: 100,
            commission_rate: 0.001,
            model_costs: false,
        }
    }
}

impl SimConfig {
    pub fn new(initial_capital: f64, warmup_bars: usize) -> Self {
        Self {
            initial_capital,
            warmup_bars,
            ..Default::default()
        }
    }

    pub fn with_costs(mut self, commission_rate: f64, model_costs: bool) -> Self {
        self.commission_rate = commission_rate;
        self.model_costs = model_costs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimConfig::default();
        assert_eq!(config.initial_capital, 10_000.0);
        assert_eq!(config.warmup_bars, 100);
        assert_eq!(config.commission_rate, 0.001);
        assert!(!config.model_costs);
    }

    #[test]
    fn builder() {
        let config = SimConfig::new(50_000.0, 10).with_costs(0.0005, true);
        assert_eq!(config.initial_capital, 50_000.0);
        assert_eq!(config.warmup_bars, 10);
        assert_eq!(config.commission_rate, 0.0005);
        assert!(config.model_costs);
    }
}
