use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use odds_core::enumerate::{MAX_STAND_AT, MIN_STAND_AT};

const DEFAULT_STAND_AT: u8 = 17;
const DEFAULT_SIMULATION_ROUNDS: usize = 200_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root configuration, loaded from YAML or built from defaults when no
/// file is given.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OddsConfig {
    #[serde(default = "default_run_id")]
    pub run_id: String,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            run_id: default_run_id(),
            table: TableConfig::default(),
            outputs: OutputsConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl OddsConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: OddsConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.table.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.simulation.validate()?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            json: resolve_template(&self.run_id, &self.outputs.json),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

fn default_run_id() -> String {
    "house-odds".to_string()
}

/// Stand-threshold configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_stand_at")]
    pub stand_at: u8,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            stand_at: default_stand_at(),
        }
    }
}

impl TableConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_STAND_AT..=MAX_STAND_AT).contains(&self.stand_at) {
            return Err(ValidationError::InvalidField {
                field: "table.stand_at".to_string(),
                message: format!(
                    "stand threshold must be within {MIN_STAND_AT}..={MAX_STAND_AT}, got {}",
                    self.stand_at
                ),
            });
        }
        Ok(())
    }
}

fn default_stand_at() -> u8 {
    DEFAULT_STAND_AT
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    #[serde(default = "default_json_output")]
    pub json: String,
    #[serde(default = "default_summary_output")]
    pub summary_md: String,
    #[serde(default = "default_plots_dir")]
    pub plots_dir: String,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            json: default_json_output(),
            summary_md: default_summary_output(),
            plots_dir: default_plots_dir(),
        }
    }
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.json", &self.json),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn default_json_output() -> String {
    "out/{run_id}/odds.json".to_string()
}

fn default_summary_output() -> String {
    "out/{run_id}/summary.md".to_string()
}

fn default_plots_dir() -> String {
    "out/{run_id}/plots".to_string()
}

/// Monte Carlo cross-check configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_simulation_rounds")]
    pub rounds: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seed: None,
            rounds: default_simulation_rounds(),
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.rounds == 0 {
            return Err(ValidationError::InvalidField {
                field: "simulation.rounds".to_string(),
                message: "simulated rounds must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_simulation_rounds() -> usize {
    DEFAULT_SIMULATION_ROUNDS
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub json: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "stand17_exact"
table:
  stand_at: 17
outputs:
  json: "out/{run_id}/odds.json"
  summary_md: "out/{run_id}/summary.md"
  plots_dir: "out/{run_id}/plots"
simulation:
  enabled: true
  seed: 4242
  rounds: 100000
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: OddsConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.table.stand_at, 17);
        assert_eq!(cfg.simulation.rounds, 100_000);
        assert!(cfg.logging.enable_structured);

        let outputs = cfg.resolved_outputs();
        assert_eq!(outputs.json, PathBuf::from("out/stand17_exact/odds.json"));
    }

    #[test]
    fn minimal_config_falls_back_to_defaults() {
        let mut cfg: OddsConfig = serde_yaml::from_str("run_id: \"quick\"").expect("parse");
        cfg.validate().expect("validate");

        assert_eq!(cfg.table.stand_at, DEFAULT_STAND_AT);
        assert!(!cfg.simulation.enabled);
        assert_eq!(cfg.simulation.rounds, DEFAULT_SIMULATION_ROUNDS);
        assert_eq!(cfg.logging.level(), Some(Level::INFO));
        assert_eq!(
            cfg.resolved_outputs().summary_md,
            PathBuf::from("out/quick/summary.md")
        );
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let yaml = BASIC_YAML.replace("stand_at: 17", "stand_at: 25");
        let mut cfg: OddsConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "table.stand_at"
        ));
    }

    #[test]
    fn rejects_zero_simulation_rounds() {
        let yaml = BASIC_YAML.replace("rounds: 100000", "rounds: 0");
        let mut cfg: OddsConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero rounds should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "simulation.rounds"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("stand17_exact", "stand 17 exact");
        let mut cfg: OddsConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace("out/{run_id}/plots", "out/{run_id}/{run_id}/plots");
        let mut cfg: OddsConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.plots_dir,
            PathBuf::from("out/stand17_exact/stand17_exact/plots")
        );
    }
}
