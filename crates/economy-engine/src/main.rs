//! Scenario Runner CLI
//!
//! Advances the compute-economy engine a configurable number of years
//! and writes the full run report as JSON.
//!
//! Usage:
//!   run-scenario --scenario scenarios/reference.json --years 25 \
//!                --output run_report.json

use anyhow::Result;
use clap::{Parser, ValueEnum};
use economy_engine::{run_scenario, EngineConfig, ScenarioFile};
use mobilization::ScenarioParams;
use orbital_shells::GrowthStrategy;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Conservative,
    Aggressive,
}

impl From<StrategyArg> for GrowthStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Conservative => GrowthStrategy::Conservative,
            StrategyArg::Aggressive => GrowthStrategy::Aggressive,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "run-scenario",
    about = "Run the ground/orbital compute economy simulation"
)]
struct Args {
    /// Scenario JSON file; omit to run the built-in reference scenario
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Years to simulate
    #[arg(short, long, default_value_t = 25)]
    years: u32,

    /// RNG seed (identical seeds reproduce identical runs)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fleet growth strategy
    #[arg(long, value_enum, default_value = "conservative")]
    strategy: StrategyArg,

    /// Grow at the top of the strategy's multiplier range
    #[arg(long)]
    max_growth: bool,

    /// Initial fleet size
    #[arg(long, default_value_t = 12)]
    initial_fleet: u64,

    /// Output JSON file
    #[arg(short, long, default_value = "run_report.json")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Helio Compute Economy Scenario Runner");
    info!("{}", "=".repeat(60));

    // Resolve scenario
    let (name, params) = match &args.scenario {
        Some(path) => {
            let scenario = ScenarioFile::load(path)?;
            let name = scenario.name.clone();
            (name, scenario.into_params()?)
        }
        None => ("reference".to_string(), ScenarioParams::reference()),
    };

    let config = EngineConfig {
        seed: args.seed,
        strategy: args.strategy.into(),
        use_max_growth: args.max_growth,
        initial_fleet: args.initial_fleet,
        start_year: params.demand_anchors[0].year,
        ..EngineConfig::default()
    };

    info!(
        "Running '{}' for {} years from {} (seed {})",
        name, args.years, config.start_year, args.seed
    );

    let report = run_scenario(&name, params, config, args.years)?;

    // Per-year summary
    for (year_state, state) in report.trajectory.iter().zip(report.states.iter()) {
        info!(
            "  {} | demand {:7.1} GW | capacity {:7.1} GW | backlog {:6.1} GW | orbital share {:.4}",
            year_state.year, year_state.demand_gw, year_state.capacity_gw, year_state.backlog_gw,
            state.orbital_share
        );
    }

    // Write output
    info!("Writing report to {:?}", args.output);
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report)?;

    // Summary
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Fleet alive: {}", report.fleet.alive);
    for (shell, count) in &report.fleet.by_shell {
        info!("  {}: {} satellites", shell, count);
    }
    info!(
        "Cumulative survival probability: {:.4}",
        report.fleet.cumulative_survival
    );
    if let Some(last) = report.states.last() {
        info!(
            "Final year {}: {:.1} GW total ({:.1} orbital), latency {:.1} ms, {:.1} Mt CO2",
            last.year, last.total_compute_gw, last.orbital_compute_gw, last.avg_latency_ms,
            last.carbon_mt
        );
    }

    Ok(())
}
