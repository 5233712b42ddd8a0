//! # Portal Module
//!
//! Typed surface over the portal's content endpoints: recording groups,
//! stream/preview URL construction, and the [`PortalClient`] facade that
//! wires the cache, auth, and HTTP layers together.

mod client;
mod types;

pub use client::{PortalClient, PortalClientBuilder};
pub use types::{AudioFile, Group, OutputInfoResponse, RecordingSession};
