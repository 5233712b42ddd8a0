//! Request and response types shared across the HTTP layer.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// HTTP methods the portal API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical API call: everything that participates in the cache key.
///
/// Query parameters and headers live in `BTreeMap`s so their rendering order
/// is stable no matter how callers assembled the request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: normalize_path(path.into()),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut req = Self::new(Method::Post, path);
        req.body = Some(body);
        req
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Leading slashes are stripped so `"/output-info"` and `"output-info"` name
/// the same endpoint (and the same cache entry).
fn normalize_path(path: String) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// A completed API call: HTTP status plus the decoded JSON body.
///
/// Cache hits are synthesized as a 200 response from the stored payload,
/// flagged with `from_cache` so callers can tell the two apart if they care.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
    pub from_cache: bool,
}

impl ApiResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body, from_cache: false }
    }

    pub fn cached(body: serde_json::Value) -> Self {
        Self { status: 200, body, from_cache: true }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(Error::from)
    }
}

/// What one network attempt produced, before the status policy is applied.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body_text: String,
}
