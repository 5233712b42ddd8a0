//! The portal client facade.

use super::types::{Group, OutputInfoResponse};
use crate::auth::{AuthApi, MemoryTokenStore, TokenStore};
use crate::cache::{CacheBackend, CacheConfig, CacheStats, MemoryCache, ResponseCache};
use crate::http::{ApiRequest, CachedFetcher, HttpTransport, RetryConfig, Transport};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for applications: typed portal operations plus the auth flow,
/// all routed through one shared [`CachedFetcher`].
pub struct PortalClient {
    fetcher: Arc<CachedFetcher>,
    auth: AuthApi,
    tokens: Arc<dyn TokenStore>,
    base_url: String,
}

impl PortalClient {
    pub fn builder() -> PortalClientBuilder {
        PortalClientBuilder::new()
    }

    /// All recording groups, newest activity first. Served from cache within
    /// the configured TTL.
    pub async fn groups(&self) -> Result<Vec<Group>> {
        let response = self.fetcher.fetch_cached(ApiRequest::get("/output-info"), true).await?;
        let info: OutputInfoResponse = response.decode()?;
        if !info.success {
            return Err(Error::Api("output-info reported failure".into()));
        }

        let mut groups: Vec<Group> = info.data.into_values().collect();
        groups.sort_by(|a, b| {
            b.latest_recording()
                .unwrap_or("")
                .cmp(a.latest_recording().unwrap_or(""))
        });
        Ok(groups)
    }

    /// Recording count across all groups.
    pub async fn total_recordings(&self) -> Result<usize> {
        Ok(self.groups().await?.iter().map(Group::recording_count).sum())
    }

    /// Full-quality stream URL for a recording. Media elements can't send an
    /// `Authorization` header, so the token rides along as a query parameter.
    pub fn stream_url(&self, sid: &str) -> String {
        let base = format!("{}/stream/{}", self.base_url, sid);
        match self.tokens.token() {
            Some(token) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
                format!("{base}?token={encoded}")
            }
            None => base,
        }
    }

    /// Short ungated preview clip; anonymous by design.
    pub fn preview_url(&self, sid: &str) -> String {
        format!("{}/preview/{}", self.base_url, sid)
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// Forced refresh: drop all cached responses and coalescing handles.
    pub async fn clear_cache(&self) {
        self.fetcher.clear_cache().await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.fetcher.cache_stats()
    }

    /// Direct access to the fetch layer for endpoints this facade doesn't
    /// model.
    pub fn fetcher(&self) -> &Arc<CachedFetcher> {
        &self.fetcher
    }
}

/// Builder for [`PortalClient`]. Only the base URL is required; everything
/// else has the defaults the hosted portal runs with.
pub struct PortalClientBuilder {
    base_url: Option<String>,
    cache_config: CacheConfig,
    cache_backend: Option<Box<dyn CacheBackend>>,
    retry: RetryConfig,
    tokens: Option<Arc<dyn TokenStore>>,
    transport: Option<Arc<dyn Transport>>,
}

impl PortalClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            cache_config: CacheConfig::default(),
            cache_backend: None,
            retry: RetryConfig::default(),
            tokens: None,
            transport: None,
        }
    }

    /// API root, e.g. `https://portal.example.com/api`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_config = self.cache_config.with_ttl(ttl);
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_config = self.cache_config.with_enabled(enabled);
        self
    }

    pub fn cache_backend(mut self, backend: Box<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Swap the network layer, e.g. for an in-process test double.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PortalClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("base URL is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(base_url.clone())?),
        };
        let tokens: Arc<dyn TokenStore> =
            self.tokens.unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let backend = self
            .cache_backend
            .unwrap_or_else(|| Box::new(MemoryCache::default()));

        let cache = ResponseCache::new(self.cache_config, backend);
        let fetcher = Arc::new(CachedFetcher::new(
            transport,
            cache,
            Arc::clone(&tokens),
            self.retry,
        ));
        let auth = AuthApi::new(Arc::clone(&fetcher), Arc::clone(&tokens));

        Ok(PortalClient { fetcher, auth, tokens, base_url })
    }
}

impl Default for PortalClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
