//! Configuration management for the evostat CLI.

use anyhow::{Context, Result};
use evostat_core::schema::Metric;
use evostat_runtime::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up from the working directory.
pub const CONFIG_FILE: &str = "evostat.toml";

/// evostat project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Keep every n-th point in plot tables.
    #[serde(default = "default_stride")]
    pub stride: usize,
    /// Metrics written as plot tables.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

fn default_directory() -> PathBuf { PathBuf::from("evostat-out") }
fn default_stride() -> usize { 1 }
fn default_metrics() -> Vec<Metric> { Metric::ALL.to_vec() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            stride: default_stride(),
            metrics: default_metrics(),
        }
    }
}

impl Config {
    /// Load config from evostat.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let start = std::env::current_dir().context("Failed to read current directory")?;
        match find_config_file(&start) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find evostat.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
