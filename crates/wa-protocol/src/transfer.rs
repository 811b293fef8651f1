//! Transfer tool-call payloads and the confirmation notice.

use serde::{Deserialize, Serialize};

/// Tool name the agent uses for native value transfers.
pub const NATIVE_TRANSFER_TOOL: &str = "nativeTransfer";

/// Placeholder shown for a transfer that has not settled yet.
pub const PENDING_TX_PLACEHOLDER: &str = "Pending...";

/// Parameters of a native transfer tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferParams {
    pub amount: String,
    pub to: String,
    #[serde(rename = "txHash", default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl TransferParams {
    /// The confirmed transaction hash, if the transfer has settled.
    /// An empty string counts as unsettled.
    pub fn settled_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref().filter(|h| !h.is_empty())
    }
}

/// A fully-formed transfer tool call decoded from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub tool: String,
    /// Human-readable summary of what the agent did (wire field
    /// `your_summary`). This is the storage-safe form of the turn.
    pub summary: String,
    pub params: TransferParams,
}

/// Data handed to the transfer confirmation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotice {
    pub amount: String,
    pub recipient: String,
    /// Transaction hash, or [`PENDING_TX_PLACEHOLDER`] when unsettled.
    pub tx_hash: String,
    pub summary: String,
}

impl TransferNotice {
    pub fn from_call(call: &TransferCall) -> Self {
        Self {
            amount: call.params.amount.clone(),
            recipient: call.params.to.clone(),
            tx_hash: call
                .params
                .settled_hash()
                .unwrap_or(PENDING_TX_PLACEHOLDER)
                .to_string(),
            summary: call.summary.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.tx_hash == PENDING_TX_PLACEHOLDER
    }
}
