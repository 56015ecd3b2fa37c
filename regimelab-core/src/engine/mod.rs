//! Simulation engine: configuration and the bar-by-bar position loop.

pub mod config;
pub mod simulator;

pub use config::SimConfig;
pub use simulator::{run_simulation, SimError, SimResult};
