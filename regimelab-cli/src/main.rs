//! RegimeLab CLI: run and calibrate commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config over a CSV bar file (or
//!   seeded synthetic data) and print a report
//! - `calibrate` — same inputs, then print the confidence/movement/joint
//!   threshold tables and the recommended operating point

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use regimelab_core::calibrate::{
    best_threshold, confidence_scan, joint_scan, movement_scan, CalibrationRow,
};
use regimelab_core::domain::PriceBar;
use regimelab_core::synthetic::{generate_bars, SyntheticConfig};
use regimelab_runner::config::RunnerConfig;
use regimelab_runner::data_loader::load_bars_csv;
use regimelab_runner::export::{export_json, export_trades_csv};
use regimelab_runner::signal_gen::MomentumCrossGenerator;
use regimelab_runner::summary::{run_symbol, BacktestReport};

#[derive(Parser)]
#[command(
    name = "regimelab",
    about = "RegimeLab CLI — regime-adaptive backtest engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest and print a run report.
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Write the trade log as CSV to this path.
        #[arg(long)]
        trades_out: Option<PathBuf>,

        /// Write the full report as JSON to this path.
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// Execute a backtest, then print threshold calibration tables.
    Calibrate {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a CSV bar file (timestamp,open,high,low,close,volume).
    #[arg(long)]
    bars: Option<PathBuf>,

    /// Generate this many synthetic bars instead of loading a file.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            trades_out,
            report_out,
        } => {
            let (_config, report) = execute(&input)?;
            print_report(&report);

            if let Some(path) = trades_out {
                std::fs::write(&path, export_trades_csv(&report.trades)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Trade log written to {}", path.display());
            }
            if let Some(path) = report_out {
                std::fs::write(&path, export_json(&report)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
        }
        Commands::Calibrate { input } => {
            let (config, report) = execute(&input)?;
            print_report(&report);
            print_calibration(&config, &report);
        }
    }

    Ok(())
}

fn execute(input: &InputArgs) -> Result<(RunnerConfig, BacktestReport)> {
    let config = match &input.config {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunnerConfig::default(),
    };

    let (bars, dataset_hash): (Vec<PriceBar>, String) = match (&input.bars, input.synthetic) {
        (Some(path), None) => {
            let loaded = load_bars_csv(path)
                .with_context(|| format!("failed to load bars from {}", path.display()))?;
            (loaded.bars, loaded.dataset_hash)
        }
        (None, Some(n)) => {
            let bars = generate_bars(n, input.seed, &SyntheticConfig::default());
            (bars, format!("synthetic:{}", input.seed))
        }
        (Some(_), Some(_)) => bail!("--bars and --synthetic are mutually exclusive"),
        (None, None) => bail!("provide either --bars <csv> or --synthetic <n>"),
    };

    let generator = MomentumCrossGenerator::default();
    let report = run_symbol(
        &config.backtest.symbol,
        &bars,
        &generator,
        &config,
        &dataset_hash,
    )?;
    Ok((config, report))
}

fn print_report(report: &BacktestReport) {
    let s = &report.summary;
    println!("{}", "=".repeat(64));
    println!("BACKTEST RESULTS: {}", s.symbol);
    println!("{}", "=".repeat(64));
    println!("Period:         {} to {}", s.start_date, s.end_date);
    println!("Dataset:        {}", report.dataset_hash);
    println!();
    println!("Capital");
    println!("  Initial:      {:>14.2}", s.initial_capital);
    println!("  Final:        {:>14.2}", s.final_equity);
    println!("  Return:       {:>13.2}%", s.total_return_pct);
    println!();
    println!("Trades");
    println!("  Total:        {:>10}", s.total_trades);
    println!("  Win rate:     {:>13.1}%", s.win_rate * 100.0);
    println!("  Profit factor:{:>14.2}", s.profit_factor);
    println!("  Max drawdown: {:>13.2}%", s.max_drawdown * 100.0);
    println!();
    println!(
        "Timing: backtest {:.3}s, metrics {:.3}s",
        s.backtest_time, s.calculation_time
    );

    if let Some(open) = &report.open_position {
        println!(
            "Open position at end of data: {:?} {} @ {:.2}",
            open.side, open.size, open.entry_price
        );
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", report.warnings.len());
        for warning in report.warnings.iter().take(10) {
            println!("  {warning}");
        }
        if report.warnings.len() > 10 {
            println!("  ... and {} more", report.warnings.len() - 10);
        }
    }
}

fn print_rows(label: &str, rows: &[CalibrationRow]) {
    println!();
    println!(
        "{label:<12} {:>8} {:>12} {:>12} {:>10}",
        "trades", "total_pnl", "avg_pnl", "win_rate"
    );
    for row in rows {
        println!(
            "{:<12.2} {:>8} {:>12.2} {:>12.2} {:>9.1}%",
            row.threshold,
            row.trade_count,
            row.total_pnl,
            row.avg_pnl,
            row.win_rate * 100.0
        );
    }
}

fn print_calibration(config: &RunnerConfig, report: &BacktestReport) {
    let cal = &config.calibration;

    println!();
    println!("{}", "=".repeat(64));
    println!("THRESHOLD CALIBRATION ({} trades)", report.trades.len());
    println!("{}", "=".repeat(64));

    let conf_rows = confidence_scan(&report.trades, &cal.confidence_thresholds);
    print_rows("confidence", &conf_rows);

    let move_rows = movement_scan(&report.trades, &cal.movement_thresholds);
    print_rows("movement", &move_rows);

    println!();
    println!(
        "{:<12} {:<12} {:>8} {:>12} {:>10}",
        "confidence", "movement", "trades", "total_pnl", "win_rate"
    );
    for row in joint_scan(
        &report.trades,
        &cal.confidence_thresholds,
        &cal.movement_thresholds,
    ) {
        if row.trade_count == 0 {
            continue;
        }
        println!(
            "{:<12.2} {:<12.2} {:>8} {:>12.2} {:>9.1}%",
            row.confidence_threshold,
            row.movement_threshold,
            row.trade_count,
            row.total_pnl,
            row.win_rate * 100.0
        );
    }

    println!();
    match best_threshold(&conf_rows, cal.min_trades) {
        Some(best) => {
            println!(
                "Best confidence threshold (min {} trades): {:.2}",
                cal.min_trades, best.threshold
            );
            println!(
                "  {} trades, total PnL {:.2}, win rate {:.1}%",
                best.trade_count,
                best.total_pnl,
                best.win_rate * 100.0
            );
        }
        None => println!(
            "No confidence threshold clears the {}-trade minimum; \
             not enough history to calibrate.",
            cal.min_trades
        ),
    }
}
