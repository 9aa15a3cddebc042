use std::path::PathBuf;

use clap::Parser;

use odds_cli::config::{OddsConfig, ResolvedOutputs};
use odds_cli::logging::init_logging;
use odds_cli::run::OddsRunner;

/// Exact dealer outcome odds for a configurable stand threshold.
#[derive(Debug, Parser)]
#[command(
    name = "house-odds",
    author,
    version,
    about = "Exact dealer outcome odds per up card"
)]
struct Cli {
    /// Path to the YAML configuration file (defaults apply when omitted).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the stand threshold.
    #[arg(long, value_name = "TOTAL")]
    stand_at: Option<u8>,

    /// Enable the Monte Carlo cross-check regardless of config.
    #[arg(long)]
    simulate: bool,

    /// Override the number of simulated dealer hands.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Override the simulation RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (nothing is computed).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => OddsConfig::from_path(path)?,
        None => OddsConfig::default(),
    };

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(stand_at) = cli.stand_at {
        config.table.stand_at = stand_at;
    }

    if cli.simulate {
        config.simulation.enabled = true;
    }

    if let Some(rounds) = cli.rounds {
        config.simulation.rounds = rounds;
    }

    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let stand_at = config.table.stand_at;

    println!("Computing dealer odds '{run_id}' (stand at {stand_at})");

    let logging_guard = init_logging(&config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: computation skipped.");
        return Ok(());
    }

    let runner = OddsRunner::new(config, outputs);
    let summary = runner.run()?;

    println!(
        "Enumerated {} minimal terminal hands for '{run_id}'",
        summary.hands_enumerated
    );
    println!("Odds snapshot: {}", summary.json_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Expected-value chart: {}", plot_path.display());
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }
    if let Some(report) = summary.simulation.as_ref() {
        println!(
            "Cross-check: {} rounds ({} rejected), worst |z| {:.2} (p={:.3}) -> {}",
            report.rounds,
            report.rejected,
            report.max_z,
            report.worst_p_value,
            if report.consistent() {
                "consistent"
            } else {
                "INCONSISTENT"
            }
        );
    }

    Ok(())
}
