use crate::domain::CacheEntry;
use crate::ports::EntryStore;
use async_trait::async_trait;
use shared::{Error, Result};
use std::path::Path;

/// Sled-backed durable store for cached responses.
///
/// Every mutation is flushed so entries survive process restarts; the whole
/// point of the cache is to shield the rate-limited upstream across many
/// short-lived server processes.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the backing database, creating parent directories
    /// if missing. Failure here means the cache directory is unreachable
    /// and should be treated as fatal at startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StoreUnavailable(format!("failed to create cache directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::StoreUnavailable(format!("failed to open cache database: {}", e)))?;

        Ok(Self { db })
    }
}

#[async_trait]
impl EntryStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| Error::Storage(format!("failed to read entry: {}", e)))?;

        match value {
            Some(bytes) => {
                let entry: CacheEntry = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Storage(format!("failed to deserialize entry: {}", e)))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let value = serde_json::to_vec(&entry)
            .map_err(|e| Error::Storage(format!("failed to serialize entry: {}", e)))?;

        self.db
            .insert(entry.key.as_bytes(), value)
            .map_err(|e| Error::Storage(format!("failed to write entry: {}", e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| Error::Storage(format!("failed to flush database: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self
            .db
            .remove(key.as_bytes())
            .map_err(|e| Error::Storage(format!("failed to delete entry: {}", e)))?
            .is_some();

        self.db
            .flush_async()
            .await
            .map_err(|e| Error::Storage(format!("failed to flush database: {}", e)))?;

        Ok(removed)
    }

    async fn check(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| Error::StoreUnavailable(format!("cache database unreachable: {}", e)))?;
        Ok(())
    }
}
