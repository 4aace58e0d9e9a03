//! In-memory caching for provider responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Defines how a single request interacts with the response cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, fetch from the network and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry,
    /// and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.stored_at) <= self.ttl
    }

    fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        self.map
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.payload.clone())
    }

    fn set(&mut self, key: String, payload: Value) {
        self.map.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.map.retain(|_, entry| now.duration_since(entry.stored_at) <= ttl);
    }
}

/// Shared TTL cache of raw provider payloads keyed by request fingerprint.
///
/// Entries older than the TTL are treated as absent on read. Clones share the
/// same underlying store.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
        }
    }

    /// Create a cache with the default TTL of 5 minutes.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Cached payload for `key`, or `None` when absent or expired.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// No-op when the cache is disabled.
    pub async fn set(&self, key: impl Into<String>, payload: Value) {
        let mut store = self.inner.write().await;
        if store.ttl == Duration::ZERO {
            return;
        }
        store.set(key.into(), payload);
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }

    pub async fn is_disabled(&self) -> bool {
        self.ttl().await == Duration::ZERO
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
