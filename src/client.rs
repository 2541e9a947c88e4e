use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{ChatError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Decoded server reply. `response` is required; `sources` may be missing or null.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one message and decode the reply
    pub async fn fetch(&self, message: &str) -> Result<ChatReply> {
        debug!(endpoint = %self.endpoint, chars = message.chars().count(), "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat request failed to send");
                ChatError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "chat endpoint returned an error status");
            return Err(ChatError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let reply: ChatReply = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "chat reply did not match the expected shape");
            ChatError::InvalidResponse(e.to_string())
        })?;

        debug!(sources = reply.sources.len(), "chat reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_reply() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"response":"hi","sources":["http://a"]}"#).unwrap();
        assert_eq!(reply.response, "hi");
        assert_eq!(reply.sources, vec!["http://a"]);
    }

    #[test]
    fn missing_or_null_sources_become_empty() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert!(reply.sources.is_empty());

        let reply: ChatReply =
            serde_json::from_str(r#"{"response":"hi","sources":null}"#).unwrap();
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn missing_response_is_rejected() {
        let result = serde_json::from_str::<ChatReply>(r#"{"error":"boom"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(ChatRequest { message: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }
}
