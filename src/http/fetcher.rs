//! The cached, coalescing, retrying fetch layer.
//!
//! Every portal API call funnels through [`CachedFetcher::fetch_cached`]:
//!
//! 1. fresh cache entry → synthesized response, no network;
//! 2. identical request already in flight → await its shared future;
//! 3. otherwise spawn the retrying network call, publish it in the pending
//!    map, and remove the entry when it settles, success or failure.
//!
//! The pending map guarantees at most one in-flight network call per request
//! signature. The call runs as its own tokio task, so it completes even if
//! every waiter stops listening; callers can abandon a request but never
//! cancel it.

use crate::auth::TokenStore;
use crate::cache::{CacheKey, CacheStats, RequestKeyBuilder, ResponseCache};
use crate::http::retry::RetryConfig;
use crate::http::transport::Transport;
use crate::http::types::{ApiRequest, ApiResponse, RawResponse};
use crate::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

type SharedFetch = Shared<BoxFuture<'static, Result<ApiResponse>>>;
type PendingMap = Arc<Mutex<HashMap<String, SharedFetch>>>;

pub struct CachedFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    tokens: Arc<dyn TokenStore>,
    retry: RetryConfig,
    keys: RequestKeyBuilder,
    pending: PendingMap,
}

impl CachedFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: ResponseCache,
        tokens: Arc<dyn TokenStore>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            cache: Arc::new(cache),
            tokens,
            retry,
            keys: RequestKeyBuilder::new(),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Execute `request`, honoring the cache when `use_cache` is true.
    pub async fn fetch_cached(&self, request: ApiRequest, use_cache: bool) -> Result<ApiResponse> {
        self.fetch_cached_with_ttl(request, use_cache, None).await
    }

    /// Like [`fetch_cached`](Self::fetch_cached), with a per-call TTL
    /// override for endpoints whose data goes stale faster than the default.
    pub async fn fetch_cached_with_ttl(
        &self,
        request: ApiRequest,
        use_cache: bool,
        ttl: Option<Duration>,
    ) -> Result<ApiResponse> {
        self.fetch_inner(request, use_cache, ttl, self.retry.clone()).await
    }

    /// Single attempt, no cache. For non-idempotent calls such as login and
    /// signup, where an automatic replay could double-submit or hammer a
    /// rate limiter. Coalescing and the 401 policy still apply.
    pub async fn fetch_once(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.fetch_inner(request, false, None, RetryConfig::none()).await
    }

    async fn fetch_inner(
        &self,
        request: ApiRequest,
        use_cache: bool,
        ttl: Option<Duration>,
        retry: RetryConfig,
    ) -> Result<ApiResponse> {
        let key = self.keys.build(&request);

        if use_cache {
            if let Some(body) = self.cache.get(&key).await {
                debug!(path = %request.path, "serving cached response");
                return Ok(ApiResponse::cached(body));
            }
        }

        // Check-then-insert happens under one lock acquisition, so two
        // concurrent callers can never both decide to dial out.
        let shared = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = pending.get(&key.hash) {
                debug!(path = %request.path, "coalescing into in-flight request");
                existing.clone()
            } else {
                let shared = self.spawn_request(request, key.clone(), use_cache, ttl, retry);
                pending.insert(key.hash.clone(), shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Drop every cache entry and forget all in-flight coalescing handles.
    /// The next call for any key behaves like a first-ever call.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Build the shared future for a new network call and hand it its own
    /// task so it runs to completion regardless of waiters.
    fn spawn_request(
        &self,
        request: ApiRequest,
        key: CacheKey,
        use_cache: bool,
        ttl: Option<Duration>,
        retry: RetryConfig,
    ) -> SharedFetch {
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let tokens = Arc::clone(&self.tokens);
        let pending = Arc::clone(&self.pending);

        let fut: BoxFuture<'static, Result<ApiResponse>> = async move {
            let result =
                run_attempts(&*transport, &cache, &*tokens, &retry, &key, &request, use_cache, ttl)
                    .await;
            // Always unpublish, or future calls would coalesce into a dead
            // future forever.
            pending.lock().unwrap_or_else(|e| e.into_inner()).remove(&key.hash);
            result
        }
        .boxed();

        let shared = fut.shared();
        tokio::spawn(shared.clone());
        shared
    }
}

/// The retry loop around single attempts. Terminal errors short-circuit;
/// retryable ones back off exponentially until the budget is spent, then
/// surface as an aggregate naming the last cause.
#[allow(clippy::too_many_arguments)]
async fn run_attempts(
    transport: &dyn Transport,
    cache: &ResponseCache,
    tokens: &dyn TokenStore,
    retry: &RetryConfig,
    key: &CacheKey,
    request: &ApiRequest,
    use_cache: bool,
    ttl: Option<Duration>,
) -> Result<ApiResponse> {
    let mut last_error: Option<Error> = None;

    for attempt in 1..=retry.max_attempts {
        match attempt_once(transport, tokens, request).await {
            Ok(response) => {
                if use_cache {
                    let ttl = ttl.unwrap_or_else(|| cache.default_ttl());
                    cache.put_with_ttl(key, response.body.clone(), ttl).await;
                }
                return Ok(response);
            }
            Err(error) => {
                if !error.is_retryable() {
                    return Err(error);
                }
                if let Some(delay) = retry.should_retry(attempt, &error) {
                    warn!(
                        path = %request.path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed ({error}), backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(error);
            }
        }
    }

    let last = last_error.unwrap_or_else(|| Error::Transport("no attempt was made".into()));
    if retry.max_attempts <= 1 {
        // Nothing was retried, so there is no aggregate to report.
        return Err(last);
    }
    Err(Error::RetriesExhausted { attempts: retry.max_attempts, last: Box::new(last) })
}

/// One network attempt plus the status policy: 401 invalidates credentials
/// and is terminal, any other non-2xx is a retryable HTTP error, a 2xx body
/// must decode as JSON.
async fn attempt_once(
    transport: &dyn Transport,
    tokens: &dyn TokenStore,
    request: &ApiRequest,
) -> Result<ApiResponse> {
    let token = tokens.token();
    let raw = transport.execute(request, token.as_deref()).await?;

    if raw.status == 401 {
        tokens.clear();
        return Err(Error::AuthExpired);
    }
    if !(200..300).contains(&raw.status) {
        return Err(Error::Http { status: raw.status, message: error_message(&raw) });
    }

    let body = if raw.body_text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&raw.body_text)?
    };
    Ok(ApiResponse::new(raw.status, body))
}

/// Prefer the server's `message` field; fall back to a body snippet.
fn error_message(raw: &RawResponse) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw.body_text) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let snippet: String = raw.body_text.chars().take(120).collect();
    if snippet.is_empty() {
        "request failed".to_string()
    } else {
        snippet
    }
}
