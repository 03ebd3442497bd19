//! The HTTP seam between the stream task and the backend.
//!
//! [`ChatTransport`] opens one streamed response per user turn. The reqwest
//! implementation is [`HttpTransport`]; tests substitute scripted transports
//! so the streaming logic can run without a network.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Raw body chunks exactly as the transport delivered them.
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Request body sent for each user turn: `{"message": "<user text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    Request(String),
    /// The backend answered with a non-success status.
    Status(u16),
    /// Reading the body failed mid-stream.
    Read(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(detail) => write!(f, "request failed: {detail}"),
            TransportError::Status(code) => write!(f, "backend returned HTTP {code}"),
            TransportError::Read(detail) => write!(f, "failed to read response body: {detail}"),
        }
    }
}

impl StdError for TransportError {}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` to `endpoint`. `Ok(None)` means the response arrived
    /// without a readable body.
    async fn open(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> Result<Option<ChunkStream>, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// The client carries no request timeout: a stalled stream stays open
    /// until the user stops it.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> Result<Option<ChunkStream>, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|err| TransportError::Read(err.to_string()))
            })
            .boxed();
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_to_message_object() {
        let body = serde_json::to_string(&ChatRequest {
            message: "hi \"there\"".to_string(),
        })
        .expect("serialize");
        assert_eq!(body, r#"{"message":"hi \"there\""}"#);
    }

    #[test]
    fn transport_errors_describe_their_cause() {
        assert_eq!(
            TransportError::Status(503).to_string(),
            "backend returned HTTP 503"
        );
        assert!(TransportError::Read("reset".into())
            .to_string()
            .contains("reset"));
    }
}
