use thiserror::Error;

/// Unified error type for the portal client.
///
/// Every variant is owned data (no wrapped transport errors), so the type is
/// `Clone`. That matters for request coalescing: when several callers await
/// the same in-flight request through a shared future, each of them receives
/// its own copy of the failure.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The server answered 401. The stored credentials have already been
    /// cleared by the time this surfaces; callers should redirect to login.
    #[error("authentication expired, please log in again")]
    AuthExpired,

    /// Non-success HTTP status other than 401.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection-level failure (DNS, TLS, refused, timed out).
    #[error("network transport error: {0}")]
    Transport(String),

    /// The response body was not the JSON we expected.
    #[error("response decode error: {0}")]
    Decode(String),

    /// The server answered 2xx but its body envelope reported failure.
    /// Terminal: the request reached the backend and was rejected there.
    #[error("portal API failure: {0}")]
    Api(String),

    /// Client misconfiguration, e.g. an unparseable base URL.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Surfaced after the retry budget is spent, naming the last cause.
    #[error("request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },
}

impl Error {
    /// Whether the retry loop may try this failure again.
    ///
    /// Auth expiry is terminal (retrying an invalidated token is pointless),
    /// configuration errors will not fix themselves, an application-level
    /// rejection would only repeat, and an exhausted budget must not be
    /// re-wrapped. Everything else is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Error::AuthExpired
                | Error::Configuration(_)
                | Error::Api(_)
                | Error::RetriesExhausted { .. }
        )
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
