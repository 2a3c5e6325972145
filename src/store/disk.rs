use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a fjall partition so fetched series survive restarts.
///
/// Keys and entries are stored as JSON. Storage errors are logged and treated
/// as cache misses.
pub struct DiskCache<K, V> {
    // Held so the partition's keyspace stays open
    _keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn open(path: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(name, PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            _marker: PhantomData,
        })
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(raw) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&raw)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
        {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        let keys = self.partition.keys().collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.read(key).unwrap_or_else(|e| {
            debug!("DiskCache get error: {}", e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            debug!("DiskCache put error: {}", e);
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = serde_json::to_vec(key)
            .map_err(anyhow::Error::from)
            .and_then(|raw_key| Ok(self.partition.remove(raw_key)?));
        if let Err(e) = res {
            debug!("DiskCache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.clear_all() {
            debug!("DiskCache clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::{InflationTable, TimeSeriesPoint};
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn table() -> InflationTable {
        InflationTable::new(vec![
            TimeSeriesPoint::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 308.4),
            TimeSeriesPoint::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 310.3),
        ])
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, InflationTable>::open(dir.path(), "series").unwrap();

        assert!(cache.get(&"fred:CPIAUCSL".to_string()).await.is_none());
        cache.put("fred:CPIAUCSL".to_string(), table(), None).await;
        assert_eq!(cache.get(&"fred:CPIAUCSL".to_string()).await, Some(table()));
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, InflationTable>::open(dir.path(), "series").unwrap();

        cache
            .put(
                "fred:CPIAUCSL".to_string(),
                table(),
                Some(Duration::from_millis(10)),
            )
            .await;
        assert!(cache.get(&"fred:CPIAUCSL".to_string()).await.is_some());

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"fred:CPIAUCSL".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove_and_clear() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, InflationTable>::open(dir.path(), "series").unwrap();

        cache.put("a".to_string(), table(), None).await;
        cache.put("b".to_string(), table(), None).await;

        cache.remove(&"a".to_string()).await;
        assert!(cache.get(&"a".to_string()).await.is_none());
        assert!(cache.get(&"b".to_string()).await.is_some());

        cache.clear().await;
        assert!(cache.get(&"b".to_string()).await.is_none());
    }
}
