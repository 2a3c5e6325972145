pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::adjust::AdjustOptions;
use crate::cli::rate::RateOptions;
use crate::core::config::AppConfig;
use crate::core::series::DEFAULT_SERIES_ID;
use crate::core::{ConversionDefaults, InflationTable, SeriesProvider};
use crate::providers::csv_table::{CsvTableProvider, read_table};
use crate::providers::fred::FredProvider;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where the index table for a command comes from.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    /// Local CSV file, takes precedence over any configured provider
    pub table_path: Option<PathBuf>,
    /// Overrides the configured series id
    pub series_id: Option<String>,
}

pub enum AppCommand {
    Adjust(TableSource, AdjustOptions),
    Rate(TableSource, RateOptions),
    Series {
        series_ids: Vec<String>,
        output: Option<PathBuf>,
        /// Bypass cached copies of the requested series
        refresh: bool,
    },
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("realprice starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(growth_rate = config.growth_rate, "Loaded config");

    // Omitted dates mean today
    let today = chrono::Utc::now().date_naive();
    let defaults = ConversionDefaults::new(today).with_growth_rate(config.growth_rate);

    match command {
        AppCommand::Adjust(source, options) => {
            let table = load_table(&config, &source).await?;
            cli::adjust::run(&options, &table, &defaults)?;
        }
        AppCommand::Rate(source, options) => {
            let table = load_table(&config, &source).await?;
            cli::rate::run(&options, &table, &defaults)?;
        }
        AppCommand::Series {
            series_ids,
            output,
            refresh,
        } => {
            let provider = series_provider(&config)?;
            let series_ids = if series_ids.is_empty() {
                vec![default_series_id(&config)]
            } else {
                series_ids
            };
            if refresh {
                for id in &series_ids {
                    provider.evict(id).await;
                }
            }
            cli::series::run(provider.as_ref(), &series_ids, output.as_deref()).await?;
        }
        AppCommand::ClearCache => {
            store::open_series_cache(&config).clear().await;
            info!("Cleared the series cache");
        }
    }
    Ok(())
}

fn default_series_id(config: &AppConfig) -> String {
    config
        .providers
        .fred
        .as_ref()
        .map_or(DEFAULT_SERIES_ID, |fred| fred.series_id.as_str())
        .to_string()
}

/// Picks the local provider when configured, FRED otherwise.
fn series_provider(config: &AppConfig) -> Result<Box<dyn SeriesProvider>> {
    if let Some(local) = &config.providers.local {
        debug!("Using local series directory {}", local.directory);
        return Ok(Box::new(CsvTableProvider::new(&local.directory)));
    }

    let fred = config.providers.fred.clone().unwrap_or_default();
    let api_key = fred.api_key.as_deref().context(
        "No FRED API key configured; set providers.fred.api_key or pass --table",
    )?;
    let cache = store::open_series_cache(config);
    let ttl = Duration::from_secs(config.cache_ttl_hours * 60 * 60);
    Ok(Box::new(FredProvider::new(&fred.base_url, api_key, cache, ttl)))
}

async fn load_table(config: &AppConfig, source: &TableSource) -> Result<InflationTable> {
    if let Some(path) = &source.table_path {
        return read_table(path);
    }

    let provider = series_provider(config)?;
    let series_id = source
        .series_id
        .clone()
        .unwrap_or_else(|| default_series_id(config));

    let spinner = cli::ui::new_spinner(&format!("Fetching {series_id}..."));
    let table = provider.fetch_series(&series_id).await;
    spinner.finish_and_clear();
    table
}
