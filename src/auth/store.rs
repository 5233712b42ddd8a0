//! Credential storage.

use std::sync::RwLock;
use tracing::warn;

/// Env fallback read by [`KeyringTokenStore`] when the OS keychain has no
/// entry (CI, headless servers).
const TOKEN_ENV_VAR: &str = "AMINO_PORTAL_TOKEN";

/// Where the session token lives.
///
/// The fetcher reads the token before every network attempt and clears the
/// store when the server answers 401, so implementations must be cheap to
/// read and safe to call from concurrent tasks.
pub trait TokenStore: Send + Sync {
    /// Current token, if any. Implementations discard malformed tokens
    /// instead of returning them.
    fn token(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Structural check only: a session token is a JWT, i.e. three non-empty
/// dot-separated segments. No signature verification happens client-side.
pub fn is_well_formed(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}

fn filter_well_formed(token: String) -> Option<String> {
    if is_well_formed(&token) {
        Some(token)
    } else {
        warn!("discarding stored token with invalid structure");
        None
    }
}

/// Process-local store. The default: tests and short-lived tools have no
/// reason to touch the keychain.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: RwLock::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        guard.clone().and_then(filter_well_formed)
    }

    fn set(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
    }

    fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// OS-keychain-backed store, with an `AMINO_PORTAL_TOKEN` env fallback for
/// reads. Keychain failures are logged and treated as "no token" rather than
/// surfaced; a portal client should degrade to the logged-out state, not
/// crash, when the keychain is unavailable.
pub struct KeyringTokenStore {
    service: String,
    account: String,
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    fn entry(&self) -> Option<keyring::Entry> {
        match keyring::Entry::new(&self.service, &self.account) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(service = %self.service, "keychain unavailable: {e}");
                None
            }
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new("amino-portal", "session")
    }
}

impl TokenStore for KeyringTokenStore {
    fn token(&self) -> Option<String> {
        if let Some(entry) = self.entry() {
            if let Ok(token) = entry.get_password() {
                return filter_well_formed(token);
            }
        }
        std::env::var(TOKEN_ENV_VAR).ok().and_then(filter_well_formed)
    }

    fn set(&self, token: &str) {
        if let Some(entry) = self.entry() {
            if let Err(e) = entry.set_password(token) {
                warn!("failed to store token in keychain: {e}");
            }
        }
    }

    fn clear(&self) {
        if let Some(entry) = self.entry() {
            // Missing entry is fine; that's already the target state.
            if let Err(e) = entry.delete_password() {
                if !matches!(e, keyring::Error::NoEntry) {
                    warn!("failed to remove token from keychain: {e}");
                }
            }
        }
    }
}
