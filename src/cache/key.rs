//! Cache key generation.

use crate::http::types::ApiRequest;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A cache key for one logical request.
///
/// The `hash` is the identity; `method` and `path` are carried along purely
/// for log readability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: String,
    pub method: Option<String>,
    pub path: Option<String>,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into(), method: None, path: None }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Builds deterministic keys from request signatures.
///
/// All variable parts of a request (query parameters, headers) are rendered
/// through a `BTreeMap`, so insertion order never changes the key. Two
/// logically identical requests always collapse onto the same entry.
pub struct RequestKeyBuilder {
    include_headers: bool,
    salt: Option<String>,
}

impl RequestKeyBuilder {
    pub fn new() -> Self {
        Self { include_headers: true, salt: None }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.include_headers = false;
        self
    }

    pub fn build(&self, request: &ApiRequest) -> CacheKey {
        let mut parts: BTreeMap<&str, String> = BTreeMap::new();
        parts.insert("method", request.method.as_str().to_string());
        parts.insert("path", request.path.clone());
        if !request.query.is_empty() {
            // BTreeMap already sorts; serde_json keeps that order.
            parts.insert("query", serde_json::to_string(&request.query).unwrap_or_default());
        }
        if self.include_headers && !request.headers.is_empty() {
            parts.insert("headers", serde_json::to_string(&request.headers).unwrap_or_default());
        }
        if let Some(body) = &request.body {
            parts.insert("body", canonical_json(body));
        }
        if let Some(salt) = &self.salt {
            parts.insert("salt", salt.clone());
        }

        let canonical = serde_json::to_string(&parts).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();

        CacheKey::new(hash)
            .with_method(request.method.as_str())
            .with_path(&request.path)
    }
}

impl Default for RequestKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable stringification: object keys sorted recursively, so that two
/// `serde_json::Value` bodies that are structurally equal serialize
/// identically regardless of how they were assembled.
fn canonical_json(value: &serde_json::Value) -> String {
    fn sort(value: &serde_json::Value) -> serde_json::Value {
        match value {
            serde_json::Value::Object(map) => {
                let sorted: BTreeMap<&String, serde_json::Value> =
                    map.iter().map(|(k, v)| (k, sort(v))).collect();
                serde_json::to_value(sorted).unwrap_or(serde_json::Value::Null)
            }
            serde_json::Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(sort).collect())
            }
            other => other.clone(),
        }
    }
    serde_json::to_string(&sort(value)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_requests_share_a_key() {
        let a = ApiRequest::get("/output-info");
        let b = ApiRequest::get("/output-info");
        let builder = RequestKeyBuilder::new();
        assert_eq!(builder.build(&a).hash, builder.build(&b).hash);
    }

    #[test]
    fn key_is_insensitive_to_insertion_order() {
        let a = ApiRequest::get("/recordings")
            .query("format", "mp3")
            .query("limit", "10")
            .header("accept", "application/json")
            .header("x-client", "test");
        let b = ApiRequest::get("/recordings")
            .query("limit", "10")
            .query("format", "mp3")
            .header("x-client", "test")
            .header("accept", "application/json");
        let builder = RequestKeyBuilder::new();
        assert_eq!(builder.build(&a).hash, builder.build(&b).hash);
    }

    #[test]
    fn body_key_order_does_not_matter() {
        let a = ApiRequest::post("/auth/login", json!({"email": "a@b.c", "password": "pw"}));
        let b = ApiRequest::post("/auth/login", json!({"password": "pw", "email": "a@b.c"}));
        let builder = RequestKeyBuilder::new();
        assert_eq!(builder.build(&a).hash, builder.build(&b).hash);
    }

    #[test]
    fn different_requests_diverge() {
        let builder = RequestKeyBuilder::new();
        let base = builder.build(&ApiRequest::get("/output-info")).hash;
        assert_ne!(builder.build(&ApiRequest::get("/auth/requests")).hash, base);
        assert_ne!(
            builder.build(&ApiRequest::post("/output-info", json!({}))).hash,
            base
        );
        assert_ne!(
            builder.build(&ApiRequest::get("/output-info").query("page", "2")).hash,
            base
        );
    }

    #[test]
    fn salt_changes_the_key() {
        let req = ApiRequest::get("/output-info");
        let plain = RequestKeyBuilder::new().build(&req).hash;
        let salted = RequestKeyBuilder::new().with_salt("v2").build(&req).hash;
        assert_ne!(plain, salted);
    }

    #[test]
    fn key_carries_readable_tags() {
        let key = RequestKeyBuilder::new().build(&ApiRequest::get("/output-info"));
        assert_eq!(key.method.as_deref(), Some("GET"));
        assert_eq!(key.path.as_deref(), Some("/output-info"));
    }
}
