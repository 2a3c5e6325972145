use super::broadcast::DEFAULT_GROWTH_RATE;
use super::series::DEFAULT_SERIES_ID;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    #[serde(default = "default_fred_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_series_id")]
    pub series_id: String,
}

impl Default for FredProviderConfig {
    fn default() -> Self {
        FredProviderConfig {
            base_url: default_fred_base_url(),
            api_key: None,
            series_id: default_series_id(),
        }
    }
}

/// Directory of `<series_id>.csv` files used instead of a remote service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocalProviderConfig {
    pub directory: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fred: Option<FredProviderConfig>,
    pub local: Option<LocalProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fred: Some(FredProviderConfig::default()),
            local: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            growth_rate: default_growth_rate(),
            cache_ttl_hours: default_cache_ttl_hours(),
            data_path: None,
        }
    }
}

fn default_fred_base_url() -> String {
    DEFAULT_FRED_BASE_URL.to_string()
}

fn default_series_id() -> String {
    DEFAULT_SERIES_ID.to_string()
}

fn default_growth_rate() -> f64 {
    DEFAULT_GROWTH_RATE
}

fn default_cache_ttl_hours() -> u64 {
    24
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "realprice")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "realprice")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
