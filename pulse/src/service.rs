use crate::domain::{CacheEntry, CachedBody, Freshness, ResourceDescriptor};
use crate::ports::{EntryStore, Upstream};
use dashmap::DashMap;
use shared::{Error, Result, TtlSeconds};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tunables for fetch orchestration. All of these come from configuration;
/// none are contracts.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// TTL applied to successfully fetched bodies.
    pub default_ttl: TtlSeconds,
    /// Short TTL for cached upstream not-found markers.
    pub negative_ttl: TtlSeconds,
    /// Additional attempts after the first for transient failures.
    pub max_retries: u32,
    /// Base delay, doubled on each retry.
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            default_ttl: TtlSeconds(300),
            negative_ttl: TtlSeconds(30),
            max_retries: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Degraded,
}

/// Orchestrates lookups against the store and the upstream.
///
/// Per-request state machine: check cache, then on a stale entry or a miss
/// fetch from upstream under a per-key single-flight lock. At most one
/// upstream fetch is in flight per key at any time; concurrent callers for
/// the same key observe the result of that one fetch. Distinct keys never
/// contend.
/// One in-flight fetch per key. The slot holds the outcome once the leader
/// finishes, so queued waiters consume it instead of issuing their own
/// upstream call.
type FlightSlot = Arc<Mutex<Option<Result<String>>>>;

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn EntryStore>,
    upstream: Arc<dyn Upstream>,
    policy: FetchPolicy,
    // Entries are removed when their flight completes. A caller cancelled
    // while still queued can leave an idle entry behind until the next
    // fetch for its key.
    inflight: Arc<DashMap<String, FlightSlot>>,
}

impl CacheService {
    pub fn new(store: Arc<dyn EntryStore>, upstream: Arc<dyn Upstream>, policy: FetchPolicy) -> Self {
        Self {
            store,
            upstream,
            policy,
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// Resolve a resource: serve fresh cache, or fetch and cache, or fall
    /// back to a stale entry when the upstream is throttled or failing.
    pub async fn fetch(&self, resource: &ResourceDescriptor) -> Result<CachedBody> {
        let key = resource.cache_key();

        if let Some(result) = self.try_fresh(&key).await {
            return result;
        }

        // Stale or miss: serialize upstream fetches for this key.
        let flight = self
            .inflight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();
        let mut slot = flight.lock_owned().await;

        // A queued waiter consumes the leader's outcome, success or failure,
        // so one upstream call serves every caller piled onto this key.
        if let Some(outcome) = (*slot).clone() {
            drop(slot);
            return self.resolve(&key, outcome).await;
        }

        // We are the leader for this flight. A concurrent caller may still
        // have refreshed the entry before we created the flight.
        if let Some(result) = self.try_fresh(&key).await {
            drop(slot);
            self.inflight
                .remove_if(&key, |_, flight| Arc::strong_count(flight) == 1);
            return result;
        }

        // The fetch runs on its own task owning the slot guard, so a caller
        // that disconnects mid-flight does not cancel it; the outcome still
        // lands in the cache and in the slot for queued waiters.
        let service = self.clone();
        let task_key = key.clone();
        let task_resource = resource.clone();
        let outcome = tokio::spawn(async move {
            let result = service.fetch_with_retry(&task_resource).await;
            match &result {
                Ok(body) => {
                    service
                        .store_entry(CacheEntry::new(
                            &task_key,
                            body.clone(),
                            service.policy.default_ttl,
                        ))
                        .await;
                }
                Err(Error::NotFound) => {
                    debug!(key = %task_key, "caching negative entry for missing resource");
                    service
                        .store_entry(CacheEntry::negative(&task_key, service.policy.negative_ttl))
                        .await;
                }
                Err(_) => {}
            }
            *slot = Some(result.clone());
            drop(slot);
            result
        })
        .await
        .map_err(|e| Error::Internal(format!("fetch task failed: {}", e)))?;

        // This flight is finished; the next request for the key starts a
        // new one. Waiters still holding the old slot read its outcome.
        self.inflight.remove(&key);

        self.resolve(&key, outcome).await
    }

    /// Turn a fetch outcome into a response, falling back to a stale entry
    /// when the upstream was throttled or kept failing.
    async fn resolve(&self, key: &str, outcome: Result<String>) -> Result<CachedBody> {
        match outcome {
            Ok(body) => Ok(CachedBody {
                body,
                freshness: Freshness::Fresh,
            }),
            Err(err @ (Error::RateLimited | Error::Transient(_) | Error::ServiceUnavailable(_))) => {
                // Negative markers are never served as degraded fallback.
                let stale = self.read_entry(key).await.filter(|e| !e.negative);
                match stale {
                    Some(entry) => {
                        info!(key = %key, error = %err, "upstream unavailable, serving stale entry");
                        Ok(CachedBody {
                            body: entry.body,
                            freshness: Freshness::Stale,
                        })
                    }
                    None => match err {
                        Error::Transient(msg) => Err(Error::ServiceUnavailable(msg)),
                        other => Err(other),
                    },
                }
            }
            // AuthFailed, NotFound and the rest surface as-is.
            Err(err) => Err(err),
        }
    }

    /// Remove the cached entry for a resource, if any.
    pub async fn invalidate(&self, resource: &ResourceDescriptor) -> Result<bool> {
        let key = resource.cache_key();
        let deleted = self.store.delete(&key).await?;
        if deleted {
            info!(key = %key, "cache entry invalidated");
        }
        Ok(deleted)
    }

    pub async fn health(&self) -> Health {
        match self.store.check().await {
            Ok(()) => Health::Healthy,
            Err(e) => {
                warn!("store health probe failed: {}", e);
                Health::Degraded
            }
        }
    }

    /// Answer from the cache if the entry is still fresh. A fresh negative
    /// marker answers not-found without touching the upstream.
    async fn try_fresh(&self, key: &str) -> Option<Result<CachedBody>> {
        let entry = self.read_entry(key).await?;
        if !entry.is_fresh() {
            return None;
        }
        if entry.negative {
            return Some(Err(Error::NotFound));
        }
        debug!(key = %key, "cache hit");
        Some(Ok(CachedBody {
            body: entry.body,
            freshness: Freshness::Fresh,
        }))
    }

    /// Storage faults degrade to a miss so the request can still be served
    /// directly from the upstream.
    async fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, "cache read failed, bypassing cache: {}", e);
                None
            }
        }
    }

    /// A failed write must not fail a request that already has a fresh body.
    async fn store_entry(&self, entry: CacheEntry) {
        if let Err(e) = self.store.put(entry).await {
            warn!("failed to persist cache entry: {}", e);
        }
    }

    /// Only transient failures are retried; rate limiting, auth failures
    /// and not-found come back on the first attempt.
    async fn fetch_with_retry(&self, resource: &ResourceDescriptor) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            match self.upstream.fetch(resource).await {
                Ok(body) => return Ok(body),
                Err(Error::Transient(msg)) => {
                    attempt += 1;
                    if attempt > self.policy.max_retries {
                        return Err(Error::ServiceUnavailable(format!(
                            "upstream failed after {} attempts: {}",
                            attempt, msg
                        )));
                    }
                    let delay = self.policy.backoff * 2u32.pow(attempt - 1);
                    debug!(attempt, ?delay, "transient upstream failure, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
