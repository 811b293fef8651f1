//! Decodes raw frame payloads into agent output.
//!
//! Payloads arrive double-wrapped: an outer envelope `{ "content": ... }`
//! whose `content` field is either a plain text fragment or a JSON-encoded
//! tool call (occasionally a literal object). Decoding degrades toward
//! plain text: only a well-formed `nativeTransfer` call with usable
//! parameters classifies as a transfer, and once the envelope has decoded,
//! content always comes back as *something*.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use wa_protocol::transfer::NATIVE_TRANSFER_TOOL;
use wa_protocol::{AgentPayload, TransferCall, TransferParams};

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The outer envelope was not valid JSON or lacked a `content` field.
    /// The caller decides whether to log and drop.
    #[error("malformed envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    content: Value,
}

/// The inner tool-call shape, parsed as a closed set: anything that does
/// not fit falls back to plain text.
#[derive(Debug, Deserialize)]
struct TransferWire {
    tool: String,
    your_summary: String,
    parameters: Option<TransferParams>,
}

/// Decode one raw payload into agent output.
pub fn decode(raw: &str) -> Result<AgentPayload, DecodeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    Ok(classify(envelope.content))
}

fn classify(content: Value) -> AgentPayload {
    match content {
        Value::String(text) => match serde_json::from_str::<TransferWire>(&text) {
            Ok(wire) => transfer_or_text(wire, text),
            Err(_) => AgentPayload::Text(text),
        },
        other => {
            // Literal (non-string) content. If it is not a transfer call,
            // forward its compact serialization rather than losing it.
            let literal = other.to_string();
            match serde_json::from_value::<TransferWire>(other) {
                Ok(wire) => transfer_or_text(wire, literal),
                Err(_) => AgentPayload::Text(literal),
            }
        }
    }
}

fn transfer_or_text(wire: TransferWire, original: String) -> AgentPayload {
    match wire.parameters {
        Some(params) if wire.tool == NATIVE_TRANSFER_TOOL => {
            AgentPayload::Transfer(TransferCall {
                tool: wire.tool,
                summary: wire.your_summary,
                params,
            })
        }
        _ => AgentPayload::Text(original),
    }
}
