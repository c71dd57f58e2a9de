//! Configuration file support for fitplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitplan/config.toml`.
//! Every field has a default, so a missing file or a partial file is fine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub proposal: ProposalConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Proposal generation parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProposalConfig {
    /// Weight assumed for users with no recorded weight
    #[serde(default = "default_fallback_weight_kg")]
    pub fallback_weight_kg: f64,

    /// Upper bound on exercises per proposal
    #[serde(default = "default_max_exercises")]
    pub max_exercises: usize,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            fallback_weight_kg: default_fallback_weight_kg(),
            max_exercises: default_max_exercises(),
        }
    }
}

/// Exercise catalog location
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Explicit catalog file; defaults to `catalog.json` in the data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Files kept under the data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub catalog: PathBuf,
    pub weights: PathBuf,
    pub history: PathBuf,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitplan")
}

fn default_fallback_weight_kg() -> f64 {
    60.0
}

fn default_max_exercises() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitplan")
            .join("config.toml")
    }

    /// Reject values the proposal engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let fallback = self.proposal.fallback_weight_kg;
        if !(fallback.is_finite() && fallback > 0.0) {
            return Err(Error::Config(format!(
                "proposal.fallback_weight_kg must be positive, got {}",
                fallback
            )));
        }
        if self.proposal.max_exercises == 0 {
            return Err(Error::Config(
                "proposal.max_exercises must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve data file locations, with `data_dir` overriding the config
    pub fn paths(&self, data_dir: Option<&Path>) -> DataPaths {
        let data_dir = data_dir.unwrap_or(self.data.data_dir.as_path());
        DataPaths {
            catalog: self
                .catalog
                .path
                .clone()
                .unwrap_or_else(|| data_dir.join("catalog.json")),
            weights: data_dir.join("weights.jsonl"),
            history: data_dir.join("history.json"),
        }
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
