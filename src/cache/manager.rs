//! Response cache: TTL defaults and hit accounting over a backend.

use super::backend::CacheBackend;
use super::key::CacheKey;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // The portal front end kept responses for five minutes.
            default_ttl: Duration::from_secs(5 * 60),
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Snapshot of cache traffic since construction.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Front over a [`CacheBackend`] that applies the configured default TTL and
/// counts traffic. Disabled caching turns every read into a miss and every
/// write into a no-op without touching the backend.
pub struct ResponseCache {
    backend: Box<dyn CacheBackend>,
    default_ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
}

impl ResponseCache {
    pub fn new(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            backend,
            default_ttl: config.default_ttl,
            enabled: config.enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let found = self.backend.get(key).await;
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub async fn put(&self, key: &CacheKey, payload: Value) {
        self.put_with_ttl(key, payload, self.default_ttl).await;
    }

    pub async fn put_with_ttl(&self, key: &CacheKey, payload: Value, ttl: Duration) {
        if !self.enabled {
            return;
        }
        self.backend.set(key, payload, ttl).await;
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn clear(&self) {
        self.backend.clear().await;
    }

    pub async fn len(&self) -> usize {
        self.backend.len().await
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::MemoryCache;
    use serde_json::json;

    fn cache(config: CacheConfig) -> ResponseCache {
        ResponseCache::new(config, Box::new(MemoryCache::new(16)))
    }

    #[tokio::test]
    async fn stores_and_serves_json_payloads() {
        let cache = cache(CacheConfig::default());
        let key = CacheKey::new("k");
        cache.put(&key, json!({"success": true})).await;
        assert_eq!(cache.get(&key).await, Some(json!({"success": true})));

        let stats = cache.stats();
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = cache(CacheConfig::default().with_enabled(false));
        let key = CacheKey::new("k");
        cache.put(&key, json!(1)).await;
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.stats().sets, 0);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn miss_is_counted() {
        let cache = cache(CacheConfig::default());
        assert!(cache.get(&CacheKey::new("absent")).await.is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hit_ratio(), 0.0);
    }

    #[tokio::test]
    async fn explicit_ttl_overrides_the_default() {
        let cache = cache(CacheConfig::default().with_ttl(Duration::from_secs(600)));
        let key = CacheKey::new("k");
        cache.put_with_ttl(&key, json!("short"), Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(cache.get(&key).await.is_none());
    }
}
