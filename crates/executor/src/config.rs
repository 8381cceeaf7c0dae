use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use super::error::Error;

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "EXECUTOR_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub channel_capacity: usize,
    pub csv_batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearcherConfig {
    pub interval_ms: u64,
    pub start_vertex: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub total_nodes: usize,
    pub batch_size: usize,
    pub interval_ms: u64,
    pub min_weight: i64,
    pub max_weight: i64,
    /// Chance, out of 1000, that a generated update removes an edge instead of putting one.
    pub removal_per_mille: u32,
    /// Fixed RNG seed for reproducible runs; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub searcher: SearcherConfig,
    pub simulator: SimulatorConfig,
}

/// Resolves the configuration file: `$EXECUTOR_CONFIG` if set, otherwise
/// `crates/executor/Config.toml` under the current directory.
pub fn config_path() -> Result<PathBuf, Error> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let base_path = env::current_dir().map_err(|e| {
        Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
    })?;

    Ok(base_path
        .join("crates")
        .join("executor")
        .join("Config.toml"))
}

/// Loads configuration from the resolved file and environment variables.
pub fn load_config() -> Result<Config, Error> {
    load_config_from(&config_path()?)
}

/// Loads configuration from `config_file_path`, layered with `EXECUTOR_*` variables
/// (e.g. `EXECUTOR_SEARCHER__START_VERTEX`).
pub fn load_config_from(config_file_path: &Path) -> Result<Config, Error> {
    if !config_file_path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at calculated path: {}",
            config_file_path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(config_file_path).required(true))
        .add_source(
            Environment::with_prefix("EXECUTOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    validate(&app_config)?;

    Ok(app_config)
}

fn validate(config: &Config) -> Result<(), Error> {
    if config.pipeline.channel_capacity == 0 {
        return Err(Error::ConfigLoadError(
            "pipeline.channel_capacity must be positive".to_string(),
        ));
    }
    if config.pipeline.csv_batch_size == 0 || config.simulator.batch_size == 0 {
        return Err(Error::ConfigLoadError(
            "batch sizes must be positive".to_string(),
        ));
    }
    if config.simulator.total_nodes == 0 {
        return Err(Error::ConfigLoadError(
            "simulator.total_nodes must be positive".to_string(),
        ));
    }
    if config.simulator.min_weight > config.simulator.max_weight {
        return Err(Error::ConfigLoadError(format!(
            "simulator.min_weight ({}) exceeds max_weight ({})",
            config.simulator.min_weight, config.simulator.max_weight
        )));
    }
    if config.searcher.interval_ms == 0 || config.simulator.interval_ms == 0 {
        return Err(Error::ConfigLoadError(
            "intervals must be positive".to_string(),
        ));
    }
    Ok(())
}
