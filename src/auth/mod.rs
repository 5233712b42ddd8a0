//! # Authentication Module
//!
//! The invite-only portal gates everything behind a session token. This
//! module owns both halves of that: where the token lives ([`TokenStore`])
//! and the API calls that mint, inspect, and revoke sessions ([`AuthApi`]).
//!
//! A 401 anywhere in the crate clears the active [`TokenStore`]; callers see
//! [`crate::Error::AuthExpired`] and should send the user back to login.

mod api;
mod store;
mod types;

pub use api::AuthApi;
pub use store::{is_well_formed, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use types::{
    AccessRequest, AccessRequestStatus, AccessRequestsResponse, AuthResponse, GeneratedPassword,
    GeneratePasswordsRequest, GeneratePasswordsResponse, LoginCredentials, Role, SignupRequest,
    User,
};
