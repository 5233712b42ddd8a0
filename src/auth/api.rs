//! Typed auth API over the cached fetcher.

use super::store::{is_well_formed, TokenStore};
use super::types::{
    AccessRequestsResponse, AuthResponse, GeneratePasswordsRequest, GeneratePasswordsResponse,
    LoginCredentials, SignupRequest,
};
use crate::http::{ApiRequest, CachedFetcher};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Access-request listings churn as admins approve people; keep them barely
/// warm instead of using the portal-wide default TTL.
const ACCESS_REQUESTS_TTL: Duration = Duration::from_secs(30);

/// Login, signup-request, and admin credential operations.
///
/// Status codes that mean "the user did something wrong" (bad credentials,
/// duplicate signup, rate limiting) come back as unsuccessful
/// [`AuthResponse`]s with a displayable message; infrastructure failures come
/// back as [`Error`]s.
#[derive(Clone)]
pub struct AuthApi {
    fetcher: Arc<CachedFetcher>,
    tokens: Arc<dyn TokenStore>,
}

impl AuthApi {
    pub fn new(fetcher: Arc<CachedFetcher>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { fetcher, tokens }
    }

    /// Exchange credentials for a session token. Any prior session is
    /// discarded first; a successful token is shape-validated, then stored.
    ///
    /// A single attempt: replaying a credential submission would only hammer
    /// the rate limiter, so a 429 surfaces immediately as its friendly
    /// message rather than after the backoff schedule.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        self.logout().await;

        let request = ApiRequest::post("/auth/login", serde_json::to_value(credentials)?);
        let response = match self.fetcher.fetch_once(request).await {
            Ok(response) => response,
            Err(Error::AuthExpired) => {
                return Ok(AuthResponse::failure("Invalid credentials. Please try again."));
            }
            Err(err) => {
                return friendly_failure(err, |status, message| match status {
                    429 => "Too many login attempts. Please try again later.".to_string(),
                    _ => message.to_string(),
                });
            }
        };

        let auth: AuthResponse = response.decode()?;
        if !auth.success {
            return Ok(auth);
        }

        match &auth.token {
            Some(token) if is_well_formed(token) => {
                self.tokens.set(token);
                info!(email = %credentials.email, "login succeeded");
                Ok(auth)
            }
            Some(_) => Ok(AuthResponse::failure("Invalid authentication token received")),
            None => Ok(AuthResponse::failure("Invalid response from server")),
        }
    }

    /// Ask for an invite. Like [`login`](Self::login), a single attempt
    /// that is never cached.
    pub async fn signup_request(&self, data: &SignupRequest) -> Result<AuthResponse> {
        let request = ApiRequest::post("/auth/signup-request", serde_json::to_value(data)?);
        match self.fetcher.fetch_once(request).await {
            Ok(response) => response.decode(),
            Err(err) => friendly_failure(err, |status, message| match status {
                409 => "An account with this email already exists.".to_string(),
                429 => "Too many signup attempts. Please try again later.".to_string(),
                _ => message.to_string(),
            }),
        }
    }

    /// Pending/handled access requests, for the admin console. Cached with a
    /// short TTL; fails with [`Error::AuthExpired`] when the session died.
    pub async fn access_requests(&self) -> Result<AccessRequestsResponse> {
        let request = ApiRequest::get("/auth/requests");
        let response = self
            .fetcher
            .fetch_cached_with_ttl(request, true, Some(ACCESS_REQUESTS_TTL))
            .await?;
        response.decode()
    }

    /// Admin-only: issue passwords for a batch of approved emails. A single
    /// attempt; replaying this would mint a second set of passwords.
    pub async fn generate_passwords(
        &self,
        emails: Vec<String>,
    ) -> Result<GeneratePasswordsResponse> {
        let body = serde_json::to_value(GeneratePasswordsRequest { emails })?;
        let request = ApiRequest::post("/auth/generate-passwords", body);
        let response = self.fetcher.fetch_once(request).await?;
        response.decode()
    }

    /// Drop the stored token and everything derived from the old session:
    /// cached responses and in-flight coalescing handles.
    pub async fn logout(&self) {
        self.tokens.clear();
        self.fetcher.clear_cache().await;
        debug!("session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.token()
    }
}

/// HTTP-status failures become displayable [`AuthResponse`]s; anything
/// without a status (transport, decode, config) stays a hard error. Looks
/// through [`Error::RetriesExhausted`] at the last cause.
fn friendly_failure(
    err: Error,
    message_for: impl Fn(u16, &str) -> String,
) -> Result<AuthResponse> {
    let http = match &err {
        Error::Http { status, message } => Some((*status, message.clone())),
        Error::RetriesExhausted { last, .. } => match last.as_ref() {
            Error::Http { status, message } => Some((*status, message.clone())),
            _ => None,
        },
        _ => None,
    };
    match http {
        Some((status, message)) => Ok(AuthResponse::failure(message_for(status, &message))),
        None => Err(err),
    }
}
