//! Chat API client with SSE streaming support.

use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use wa_protocol::{ChatMessage, HistoryEntry, StreamEvent};

use crate::decoder;
use crate::sse::payload_stream;

const CHAT_ENDPOINT: &str = "/api/chat";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
}

/// Client for the wallet-agent chat service.
pub struct AgentClient {
    base_url: String,
    auth_token: String,
    user_id: String,
    http: Client,
}

/// Build an HTTP client with appropriate timeouts and connection limits.
fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    user_id: &'a str,
    chat_id: &'a str,
    is_first_message: bool,
}

impl AgentClient {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: auth_token.into(),
            user_id: user_id.into(),
            http: build_http_client(),
        }
    }

    /// Send a user message and stream the decoded response events.
    ///
    /// Envelope decode failures are logged and dropped here; transport
    /// failures surface as [`StreamEvent::Error`] and end the stream.
    pub fn send(
        &self,
        chat_id: &str,
        message: &str,
        is_first_message: bool,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let http = self.http.clone();
        let url = format!("{}{CHAT_ENDPOINT}", self.base_url);
        let token = self.auth_token.clone();
        let user_id = self.user_id.clone();
        let chat_id = chat_id.to_string();
        let message = message.to_string();

        stream! {
            let request = ChatRequest {
                message: &message,
                user_id: &user_id,
                chat_id: &chat_id,
                is_first_message,
            };

            match post_chat(&http, &url, &token, &request).await {
                Ok(response) => {
                    let mut payloads = payload_stream(response.bytes_stream());

                    while let Some(result) = payloads.next().await {
                        match result {
                            Ok(raw) => match decoder::decode(&raw) {
                                Ok(payload) => yield StreamEvent::from(payload),
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping undecodable frame");
                                }
                            },
                            Err(e) => {
                                yield StreamEvent::Error(format!("stream error: {e}"));
                                return;
                            }
                        }
                    }

                    yield StreamEvent::Done;
                }
                Err(e) => {
                    yield StreamEvent::Error(e.to_string());
                }
            }
        }
    }

    /// Load the prior message log for a chat.
    pub async fn load_history(&self, chat_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
        let url = format!("{}{CHAT_ENDPOINT}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.auth_token)
            .query(&[("chatId", chat_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!("{status}: {body}")));
        }

        let entries: Vec<HistoryEntry> = response.json().await?;
        Ok(entries.into_iter().map(ChatMessage::from).collect())
    }
}

async fn post_chat(
    http: &Client,
    url: &str,
    token: &str,
    request: &ChatRequest<'_>,
) -> Result<reqwest::Response, ClientError> {
    let response = http
        .post(url)
        .bearer_auth(token)
        .header("content-type", "application/json")
        .json(request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api(format!("{status}: {body}")));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_wire_shape() {
        let request = ChatRequest {
            message: "send 0.5 ETH to alice",
            user_id: "did:privy:123",
            chat_id: "chat-9",
            is_first_message: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "send 0.5 ETH to alice");
        assert_eq!(json["userId"], "did:privy:123");
        assert_eq!(json["chatId"], "chat-9");
        assert_eq!(json["isFirstMessage"], true);
    }

    #[test]
    fn base_url_trailing_slash_normalized() {
        let client = AgentClient::new("http://localhost:3000/", "t", "u");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn new_client_does_not_panic() {
        let _client = AgentClient::new("http://localhost:3000", "token", "user");
    }
}
