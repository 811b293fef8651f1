//! wa-backend: Transport and decoding for the walletagent chat service.
//!
//! This crate turns the service's streamed SSE responses into typed
//! [`wa_protocol::StreamEvent`]s: byte framing, `data:` line extraction,
//! payload decoding, and the HTTP client itself.

pub mod client;
pub mod decoder;
pub mod mock;
pub mod sse;

pub use client::AgentClient;
pub use mock::{MockConfig, MockResponse};
