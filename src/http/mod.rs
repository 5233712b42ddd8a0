//! # HTTP Layer
//!
//! Transport, retry policy, and the cached fetcher every API module builds
//! on.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CachedFetcher`] | Cache lookup, request coalescing, retry with backoff |
//! | [`Transport`] / [`HttpTransport`] | Single-attempt request execution over reqwest |
//! | [`RetryConfig`] | Attempt budget and exponential backoff pacing |
//! | [`ApiRequest`] / [`ApiResponse`] | Request signatures and decoded responses |

mod fetcher;
mod retry;
mod transport;
pub mod types;

pub use fetcher::CachedFetcher;
pub use retry::RetryConfig;
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse, Method, RawResponse};
