//! # amino-portal
//!
//! Client SDK for the Amino recording portal API: an invite-only library of
//! audio recordings behind a token-authenticated HTTP backend.
//!
//! ## Overview
//!
//! The portal backend is read-heavy and occasionally flaky, so the SDK's core
//! is a fetch layer that makes redundant traffic disappear and transient
//! failures invisible:
//!
//! - **Response caching**: time-boxed, in-memory, keyed by a deterministic
//!   request signature.
//! - **Request coalescing**: concurrent identical calls share one network
//!   round trip.
//! - **Bounded retry**: exponential backoff for transient failures, a hard
//!   stop on authentication expiry.
//! - **Auth awareness**: a 401 clears the stored session and surfaces
//!   [`Error::AuthExpired`] so callers can redirect to login.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amino_portal::{LoginCredentials, PortalClient};
//!
//! #[tokio::main]
//! async fn main() -> amino_portal::Result<()> {
//!     let client = PortalClient::builder()
//!         .base_url("https://portal.example.com/api")
//!         .build()?;
//!
//!     let auth = client.auth();
//!     auth.login(&LoginCredentials::new("you@example.com", "password")).await?;
//!
//!     for group in client.groups().await? {
//!         println!("{} ({} recordings)", group.title, group.recording_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`http`] | Cached fetcher, transport seam, retry policy |
//! | [`cache`] | Response cache: keys, backends, manager |
//! | [`auth`] | Token storage and the login/signup/admin API |
//! | [`portal`] | Typed content surface and the client facade |

pub mod auth;
pub mod cache;
pub mod error;
pub mod http;
pub mod portal;

pub use auth::{AuthApi, LoginCredentials, SignupRequest, TokenStore};
pub use error::Error;
pub use http::{ApiRequest, ApiResponse, CachedFetcher, RetryConfig};
pub use portal::{Group, PortalClient, PortalClientBuilder};

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
