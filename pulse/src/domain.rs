use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::TtlSeconds;
use std::collections::BTreeMap;

/// A single cached upstream response.
///
/// Entries past their TTL are *stale*, not gone: the store keeps returning
/// them so they can be served as a degraded fallback while the upstream is
/// throttled or failing. Re-fetching the same logical request overwrites the
/// entry under the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    /// Opaque payload, typically serialized JSON. Empty for negative entries.
    pub body: String,
    /// Marks a cached upstream not-found, stored with a short TTL so a
    /// missing resource does not get hammered.
    #[serde(default)]
    pub negative: bool,
    pub stored_at: DateTime<Utc>,
    pub ttl: TtlSeconds,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, body: impl Into<String>, ttl: TtlSeconds) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
            negative: false,
            stored_at: Utc::now(),
            ttl,
        }
    }

    pub fn negative(key: impl Into<String>, ttl: TtlSeconds) -> Self {
        Self {
            key: key.into(),
            body: String::new(),
            negative: true,
            stored_at: Utc::now(),
            ttl,
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.stored_at) < Duration::seconds(self.ttl.0 as i64)
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

/// Identifies one logical upstream request shape.
///
/// Query parameters live in a `BTreeMap` so the derived cache key does not
/// depend on the order the caller supplied them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Upstream-relative path, e.g. `projects/123/tasks`.
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn from_parts(
        path: impl Into<String>,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            path: path.into(),
            params: params.into_iter().collect(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Deterministic cache key: path plus query parameters in sorted order.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// What the service hands back: the body plus whether it came from a live
/// fetch (or fresh entry) or a stale fallback.
#[derive(Debug, Clone)]
pub struct CachedBody {
    pub body: String,
    pub freshness: Freshness,
}

impl CachedBody {
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_order_independent() {
        let a = ResourceDescriptor::new("projects/123/tasks")
            .with_param("opt_fields", "name,completed")
            .with_param("limit", "50");
        let b = ResourceDescriptor::new("projects/123/tasks")
            .with_param("limit", "50")
            .with_param("opt_fields", "name,completed");

        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key(),
            "projects/123/tasks?limit=50&opt_fields=name,completed"
        );
    }

    #[test]
    fn cache_key_without_params_is_the_path() {
        let descriptor = ResourceDescriptor::new("workspaces");
        assert_eq!(descriptor.cache_key(), "workspaces");
    }

    #[test]
    fn entry_freshness_boundary() {
        let entry = CacheEntry::new("k", "{}", TtlSeconds(300));

        let just_inside = entry.stored_at + Duration::seconds(299);
        let just_outside = entry.stored_at + Duration::seconds(301);

        assert!(entry.is_fresh_at(just_inside));
        assert!(!entry.is_fresh_at(just_outside));
    }

    #[test]
    fn zero_ttl_entry_is_immediately_stale() {
        let entry = CacheEntry::new("k", "{}", TtlSeconds(0));
        assert!(!entry.is_fresh_at(entry.stored_at));
    }

    #[test]
    fn negative_entry_has_empty_body() {
        let entry = CacheEntry::negative("missing", TtlSeconds(30));
        assert!(entry.negative);
        assert!(entry.body.is_empty());
    }
}
