//! HTTP transport over reqwest.

use crate::http::types::{ApiRequest, Method, RawResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use uuid::Uuid;

/// A single network attempt. The fetcher owns the status policy (401
/// handling, retry, caching); transports only move bytes.
///
/// Being a trait seam, retry sequencing can be tested against a scripted
/// in-process transport without a server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<RawResponse>;
}

/// Production transport: one pooled reqwest client for the portal base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if url::Url::parse(&base_url).is_err() {
            return Err(Error::Configuration(format!("invalid base URL: {base_url}")));
        }

        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("AMINO_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(
                env::var("AMINO_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(16),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("AMINO_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("AMINO_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut req = match request.method {
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
            Method::Get => self.client.get(&url),
        };

        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        // Correlation id; the backend may ignore it, but it ties client logs
        // to server logs when it doesn't.
        req = req.header("x-portal-request-id", Uuid::new_v4().to_string());

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body_text = response.text().await?;

        Ok(RawResponse { status, body_text })
    }
}
