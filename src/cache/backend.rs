//! Cache storage.

use super::key::CacheKey;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// One cached response body and when it was stored.
struct Entry {
    payload: Value,
    stored_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) <= self.ttl
    }
}

/// Storage behind the [`ResponseCache`](super::ResponseCache).
///
/// Payloads are the decoded JSON bodies the fetcher works with; backends
/// never see wire bytes. A stale entry must read as absent.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fresh payload for `key`, if any.
    async fn get(&self, key: &CacheKey) -> Option<Value>;
    async fn set(&self, key: &CacheKey, payload: Value, ttl: Duration);
    async fn clear(&self);
    /// Number of fresh entries.
    async fn len(&self) -> usize;
}

/// In-memory storage with lazy TTL expiry: a stale entry is dropped at read
/// time, never served. At capacity, the entry idle the longest goes first.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    capacity: usize,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(512)
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&key.hash) {
            if entry.is_fresh(now) {
                entry.last_accessed = now;
                return Some(entry.payload.clone());
            }
        } else {
            return None;
        }
        // Lazy expiry: the stale entry is dropped on the read that found it.
        entries.remove(&key.hash);
        None
    }

    async fn set(&self, key: &CacheKey, payload: Value, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, e| e.is_fresh(now));
        while entries.len() >= self.capacity {
            let coldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            match coldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
        entries.insert(
            key.hash.clone(),
            Entry { payload, stored_at: now, ttl, last_accessed: now },
        );
    }

    async fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|e| e.is_fresh(now)).count()
    }
}

/// No-op storage: every read misses, writes vanish. Used when callers want
/// the fetcher's coalescing and retry without any response reuse.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _: &CacheKey) -> Option<Value> {
        None
    }
    async fn set(&self, _: &CacheKey, _: Value, _: Duration) {}
    async fn clear(&self) {}
    async fn len(&self) -> usize {
        0
    }
}
