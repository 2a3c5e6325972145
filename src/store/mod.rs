pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::series::InflationTable;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

pub type SeriesCache = Arc<dyn Cache<String, InflationTable>>;

/// Opens the on-disk series cache under `<data_path>/cache`, falling back to
/// an in-memory cache when the data directory is unusable.
pub fn open_series_cache(config: &AppConfig) -> SeriesCache {
    let disk = config.default_data_path().and_then(|path| {
        DiskCache::<String, InflationTable>::open(&path.join("cache"), "series")
    });

    match disk {
        Ok(cache) => {
            debug!("Using disk series cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Disk cache unavailable ({}), caching in memory only", e);
            Arc::new(MemoryCache::<String, InflationTable>::new())
        }
    }
}
