//! # Response Caching Module
//!
//! Time-boxed, in-memory caching of API responses, keyed by a deterministic
//! request signature. Reduces redundant round trips to the portal backend for
//! the read-heavy endpoints (group listings, access requests).
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | TTL defaults and hit statistics over a backend |
//! | [`CacheConfig`] | Default TTL and the enabled switch |
//! | [`CacheBackend`] | Trait for implementing custom cache backends |
//! | [`MemoryCache`] | In-memory cache with lazy expiry and LRU-style eviction |
//! | [`NullCache`] | No-op cache for disabling caching |
//! | [`CacheKey`] / [`RequestKeyBuilder`] | Deterministic key generation from request signatures |
//!
//! ## Cache Key Generation
//!
//! Keys are derived from method, path, query parameters, headers, and body.
//! All map-shaped parts are rendered in sorted order before hashing, so two
//! logically identical requests always produce the same key, which is the
//! property the request coalescing in [`crate::http::CachedFetcher`] relies on.
//!
//! ## Example
//!
//! ```rust
//! use amino_portal::cache::{ResponseCache, CacheConfig, MemoryCache};
//! use std::time::Duration;
//!
//! let backend = MemoryCache::new(512);
//! let config = CacheConfig::new().with_ttl(Duration::from_secs(300));
//! let cache = ResponseCache::new(config, Box::new(backend));
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{CacheKey, RequestKeyBuilder};
pub use manager::{CacheConfig, CacheStats, ResponseCache};
