//! Conversation messages and streaming events.

use serde::{Deserialize, Serialize};

use crate::transfer::TransferCall;

/// Role in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One entry of the chat service's history endpoint, which keys messages
/// by `sender` rather than `role`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sender: String,
    pub content: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        // Anything the server does not mark as the user is agent output.
        let role = if entry.sender == "user" {
            Role::User
        } else {
            Role::Assistant
        };
        Self {
            role,
            content: entry.content,
        }
    }
}

/// One decoded unit of agent output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentPayload {
    /// An incremental text fragment to append to the open assistant turn.
    Text(String),
    /// A completed transfer tool call that replaces the turn body.
    Transfer(TransferCall),
}

/// Events emitted during a streaming response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of response text.
    TextDelta(String),
    /// A structured transfer tool call.
    Transfer(TransferCall),
    /// Stream has completed successfully.
    Done,
    /// The request failed; fatal for this turn.
    Error(String),
}

impl From<AgentPayload> for StreamEvent {
    fn from(payload: AgentPayload) -> Self {
        match payload {
            AgentPayload::Text(text) => StreamEvent::TextDelta(text),
            AgentPayload::Transfer(call) => StreamEvent::Transfer(call),
        }
    }
}
