use crate::eval::{KValues, DEFAULT_K_VALUES};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ranking evaluation settings
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Cutoffs for recall@k and manual effort@k.
    #[serde(default = "default_k_values")]
    pub k_values: Vec<usize>,
    /// Directory receiving rank_info_<run>.csv and metrics_<run>.csv.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Suffix distinguishing artifacts of different runs (e.g. a checkpoint name).
    #[serde(default = "default_run_name")]
    pub run_name: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k_values: default_k_values(),
            output_dir: default_output_dir(),
            run_name: default_run_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_k_values() -> Vec<usize> {
    DEFAULT_K_VALUES.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("metrics")
}

fn default_run_name() -> String {
    "final_model".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line values that replace their config file counterparts.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub k_values: Option<Vec<usize>>,
    pub output_dir: Option<PathBuf>,
    pub run_name: Option<String>,
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path specified in PATCHRANK_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (optional; defaults when absent)
    pub fn load() -> Result<Self> {
        Self::load_with(None, ConfigOverrides::default())
    }

    /// Load and validate a specific config file
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::load_with(Some(path), ConfigOverrides::default())
    }

    /// Load from `path` (or the default lookup), apply overrides, then validate
    /// the merged result once.
    pub fn load_with(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let _ = dotenv::dotenv();

        let mut config = match path {
            Some(path) => Self::parse(path)?,
            None => match std::env::var("PATCHRANK_CONFIG") {
                Ok(path) => Self::parse(Path::new(&path))?,
                Err(_) if Path::new("config.toml").exists() => {
                    Self::parse(Path::new("config.toml"))?
                }
                Err(_) => {
                    log::debug!("No config.toml found, using defaults");
                    Config::default()
                }
            },
        };

        if let Some(k_values) = overrides.k_values {
            config.evaluation.k_values = k_values;
        }
        if let Some(output_dir) = overrides.output_dir {
            config.evaluation.output_dir = output_dir;
        }
        if let Some(run_name) = overrides.run_name {
            config.evaluation.run_name = run_name;
        }

        config.validate()?;
        Ok(config)
    }

    fn parse(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        self.k_values()
            .context("evaluation.k_values must be a non-empty list of integers >= 1")?;

        if self.evaluation.run_name.trim().is_empty() {
            anyhow::bail!("evaluation.run_name must not be empty");
        }

        Ok(())
    }

    pub fn k_values(&self) -> crate::Result<KValues> {
        KValues::new(self.evaluation.k_values.clone())
    }

    pub fn rank_table_path(&self) -> PathBuf {
        self.evaluation
            .output_dir
            .join(format!("rank_info_{}.csv", self.evaluation.run_name))
    }

    pub fn metrics_table_path(&self) -> PathBuf {
        self.evaluation
            .output_dir
            .join(format!("metrics_{}.csv", self.evaluation.run_name))
    }

    pub fn prediction_log_path(&self) -> PathBuf {
        self.evaluation
            .output_dir
            .join(format!("predict_{}.csv", self.evaluation.run_name))
    }
}
