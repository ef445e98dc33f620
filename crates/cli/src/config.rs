//! Configuration management for the CLI
//!
//! Values are layered: built-in defaults, then the JSON config file, then
//! `AQI_*` environment variables. Command-line flags override all of them.

use aqi_lib::LiveDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public WAQI endpoint
pub const DEFAULT_API_URL: &str = "https://api.waqi.info/";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed API base URL
    pub api_url: String,
    /// Feed API token
    pub api_token: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Seed for synthetic data and the held-out split
    pub seed: u64,
    /// Number of synthetic samples when no data files are given
    pub samples: usize,
    /// Share of samples held out for evaluation
    pub test_fraction: f64,
    /// Target column name in CSV inputs
    pub target_column: String,
    /// Feature values assumed for live readings
    pub live_defaults: LiveDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            timeout_secs: 30,
            seed: 42,
            samples: 1000,
            test_fraction: aqi_lib::estimator::DEFAULT_TEST_FRACTION,
            target_column: "aqi".to_string(),
            live_defaults: LiveDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location and environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        Self::load_from(&path)
    }

    /// Load configuration from `path` (if present) and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("AQI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("aqi").join("config.json"))
    }
}
