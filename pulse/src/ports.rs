use crate::domain::{CacheEntry, ResourceDescriptor};
use async_trait::async_trait;
use shared::Result;

// Ports are the pluggable seams: the storage backend and the upstream
// network boundary. The service only ever sees these traits.

/// Passive persistence layer for cache entries. No business logic lives
/// here; staleness is judged by the service, not the store.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// A missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Overwrites any existing entry under the same key.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Idempotent. Returns whether an entry was actually removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Reachability probe used by the health endpoint.
    async fn check(&self) -> Result<()>;
}

/// One authenticated call against the upstream API. Pure network boundary;
/// no caching or retry logic belongs here.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    async fn fetch(&self, resource: &ResourceDescriptor) -> Result<String>;
}
