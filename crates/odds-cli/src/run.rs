use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{Level, event};

use odds_core::enumerate::{EnumerateError, enumerate_hands};
use odds_core::odds::{DrawTable, aggregate};

use crate::config::{OddsConfig, ResolvedOutputs};
use crate::report::{
    ReportError, render_expected_value_chart, write_snapshot_json, write_summary_markdown,
};
use crate::simulate::{SimulationReport, run_simulation};

/// Primary entry point orchestrating enumerate -> aggregate -> artifacts.
pub struct OddsRunner {
    config: OddsConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub stand_at: u8,
    pub hands_enumerated: usize,
    pub json_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub simulation: Option<SimulationReport>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OddsRunner {
    pub fn new(config: OddsConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute the pipeline, writing the JSON snapshot, markdown summary,
    /// and expected-value chart to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.json.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let stand_at = self.config.table.stand_at;
        let hands = enumerate_hands(stand_at)?;
        event!(
            Level::INFO,
            stand_at,
            hands = hands.len(),
            "enumeration complete"
        );

        let draw = DrawTable::standard();
        let tables = aggregate(&hands, &draw, stand_at);

        write_snapshot_json(&tables, &self.outputs.json)?;
        write_summary_markdown(&tables, &self.outputs.summary_md)?;

        let plot_path = match render_expected_value_chart(&tables, &self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let simulation = if self.config.simulation.enabled {
            let seed = self.config.simulation.seed.unwrap_or(0);
            let report = run_simulation(&draw, &tables, self.config.simulation.rounds, seed);
            event!(
                Level::INFO,
                rounds = report.rounds,
                rejected = report.rejected,
                max_z = report.max_z,
                "simulation cross-check complete"
            );
            Some(report)
        } else {
            None
        };

        Ok(RunSummary {
            stand_at,
            hands_enumerated: hands.len(),
            json_path: self.outputs.json.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            simulation,
        })
    }
}

fn ensure_parent(parent: Option<&Path>) -> Result<(), std::io::Error> {
    if let Some(parent) = parent {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
