//! Mock event source for testing.
//!
//! Produces the exact same `StreamEvent` sequence as the real chat client,
//! allowing tests at every layer to use the mock instead of real HTTP.

use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use tokio::time::sleep;

use wa_protocol::transfer::NATIVE_TRANSFER_TOOL;
use wa_protocol::{StreamEvent, TransferCall, TransferParams};

/// Configurable mock responses for testing.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Emit a text delta.
    Text { content: String },
    /// Emit a transfer tool call.
    Transfer { call: TransferCall },
    /// Emit an error.
    Error { message: String },
    /// Delay before the next event (for timing tests).
    Delay { ms: u64 },
}

/// Configuration for a mock stream.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Sequence of responses to emit.
    pub responses: Vec<MockResponse>,
    /// Optional delay between each event (ms).
    pub chunk_delay_ms: Option<u64>,
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(mut self, responses: Vec<MockResponse>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_chunk_delay(mut self, ms: u64) -> Self {
        self.chunk_delay_ms = Some(ms);
        self
    }
}

/// Create a stream of StreamEvents from mock config.
pub fn mock_stream(config: MockConfig) -> impl Stream<Item = StreamEvent> {
    stream! {
        for response in config.responses {
            if let Some(delay_ms) = config.chunk_delay_ms {
                sleep(Duration::from_millis(delay_ms)).await;
            }

            match response {
                MockResponse::Text { content } => {
                    yield StreamEvent::TextDelta(content);
                }
                MockResponse::Transfer { call } => {
                    yield StreamEvent::Transfer(call);
                }
                MockResponse::Error { message } => {
                    yield StreamEvent::Error(message);
                }
                MockResponse::Delay { ms } => {
                    sleep(Duration::from_millis(ms)).await;
                    // Delay doesn't emit an event
                }
            }
        }

        yield StreamEvent::Done;
    }
}

/// Built-in test fixtures for common scenarios.
pub mod fixtures {
    use super::*;

    /// A transfer call with the given parameters.
    pub fn native_transfer(
        amount: &str,
        to: &str,
        tx_hash: Option<&str>,
        summary: &str,
    ) -> TransferCall {
        TransferCall {
            tool: NATIVE_TRANSFER_TOOL.to_string(),
            summary: summary.to_string(),
            params: TransferParams {
                amount: amount.to_string(),
                to: to.to_string(),
                tx_hash: tx_hash.map(str::to_string),
            },
        }
    }

    /// A mock config that streams text in chunks.
    pub fn streaming_text(chunks: &[&str]) -> MockConfig {
        let responses = chunks
            .iter()
            .map(|chunk| MockResponse::Text {
                content: (*chunk).to_string(),
            })
            .collect();

        MockConfig::new().with_responses(responses)
    }

    /// A mock config with leading text followed by a transfer call.
    pub fn text_then_transfer(text: &str, call: TransferCall) -> MockConfig {
        MockConfig::new().with_responses(vec![
            MockResponse::Text {
                content: text.to_string(),
            },
            MockResponse::Transfer { call },
        ])
    }

    /// A mock config that errors mid-stream.
    pub fn error_mid_stream(text_before: &str, error: &str) -> MockConfig {
        MockConfig::new().with_responses(vec![
            MockResponse::Text {
                content: text_before.to_string(),
            },
            MockResponse::Error {
                message: error.to_string(),
            },
        ])
    }
}
