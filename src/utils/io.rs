use crate::problem::Problem;
use clap::Parser;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
pub struct Args {
    /// Path to the problem JSON file
    #[arg(short, long)]
    pub problem: PathBuf,

    /// Path to the simulation config JSON file
    #[arg(short, long)]
    pub config: PathBuf,

    /// RNG seed; a fixed seed reproduces the whole run
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Fuel cost weight (C)
    #[arg(long, default_value_t = 1.0)]
    pub fuel_weight: f64,

    /// Mean lateness penalty weight (alpha)
    #[arg(long, default_value_t = 0.0)]
    pub alpha: f64,

    /// Write per-iteration records to this Parquet file
    #[arg(short, long)]
    pub metrics: Option<PathBuf>,
}

/// Simulation configuration file. The entity counts double as a sanity
/// check against the problem file the run is pointed at.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub n_couriers: usize,
    pub n_vehicles: usize,
    pub n_packages: usize,
    /// Initial population target; must be even and at least 2.
    pub num_to_find: usize,
    /// Attempt budget for the initial-population generator.
    pub max_attempts: usize,
    pub max_iter: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
    Mismatch(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "io error: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::Mismatch(msg) => write!(f, "config does not match the problem: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;

        if config.num_to_find < 2 || config.num_to_find % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "num_to_find must be an even number of at least 2, got {}",
                config.num_to_find
            )));
        }
        if config.max_attempts < 1 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if config.max_iter < 1 {
            return Err(ConfigError::Invalid("max_iter must be at least 1".into()));
        }

        Ok(config)
    }

    /// Verifies the declared entity counts against the loaded problem.
    pub fn validate(&self, problem: &Problem) -> Result<(), ConfigError> {
        let pairs = [
            ("n_couriers", self.n_couriers, problem.n_couriers()),
            ("n_vehicles", self.n_vehicles, problem.n_vehicles()),
            ("n_packages", self.n_packages, problem.n_packages()),
        ];
        for (key, declared, actual) in pairs {
            if declared != actual {
                return Err(ConfigError::Mismatch(format!(
                    "{} is {} but the problem has {}",
                    key, declared, actual
                )));
            }
        }
        Ok(())
    }
}
