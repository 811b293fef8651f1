//! wa-protocol: Shared types and message definitions for walletagent.
//!
//! This crate defines the protocol types used between the core client,
//! the streaming backend, and any future frontends.

pub mod message;
pub mod transfer;

pub use message::{AgentPayload, ChatMessage, HistoryEntry, Role, StreamEvent};
pub use transfer::{TransferCall, TransferNotice, TransferParams};
