use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::decoder::Utf8StreamDecoder;
use crate::core::framing::{IncrementFramer, WireFormat};
use crate::core::transport::{ChatRequest, ChatTransport, TransportError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    /// One increment of reply text.
    Chunk(String),
    Error(FailureCause),
    End,
}

/// Why a generation failed. Logged, never shown: the transcript only ever
/// carries the generic failure notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureCause {
    StreamUnavailable,
    HttpStatus(u16),
    Transport(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::StreamUnavailable => f.write_str("response carried no readable body"),
            FailureCause::HttpStatus(code) => write!(f, "backend returned HTTP {code}"),
            FailureCause::Transport(detail) => f.write_str(detail),
        }
    }
}

impl From<TransportError> for FailureCause {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status(code) => FailureCause::HttpStatus(code),
            other => FailureCause::Transport(other.to_string()),
        }
    }
}

pub struct StreamParams {
    pub transport: Arc<dyn ChatTransport>,
    pub endpoint: String,
    pub wire_format: WireFormat,
    pub message: String,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

impl fmt::Debug for StreamParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamParams")
            .field("endpoint", &self.endpoint)
            .field("wire_format", &self.wire_format)
            .field("message", &self.message)
            .field("stream_id", &self.stream_id)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                transport,
                endpoint,
                wire_format,
                message,
                cancel_token,
                stream_id,
            } = params;

            let request = ChatRequest { message };
            debug!(stream_id, %endpoint, %wire_format, "Opening response stream");

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "Response stream cancelled");
                }
                outcome = pump_stream(
                    transport.as_ref(),
                    &endpoint,
                    wire_format,
                    &request,
                    &cancel_token,
                    &tx,
                    stream_id,
                ) => {
                    if cancel_token.is_cancelled() {
                        return;
                    }
                    match outcome {
                        Ok(()) => {
                            debug!(stream_id, "Response stream finished");
                            let _ = tx.send((StreamMessage::End, stream_id));
                        }
                        Err(cause) => {
                            warn!(stream_id, %cause, "Response stream failed");
                            let _ = tx.send((StreamMessage::Error(cause), stream_id));
                        }
                    }
                }
            }
        })
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn pump_stream(
    transport: &dyn ChatTransport,
    endpoint: &str,
    wire_format: WireFormat,
    request: &ChatRequest,
    cancel_token: &CancellationToken,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> Result<(), FailureCause> {
    let Some(mut body) = transport.open(endpoint, request).await? else {
        return Err(FailureCause::StreamUnavailable);
    };

    let mut decoder = Utf8StreamDecoder::new();
    let mut framer = IncrementFramer::new(wire_format);

    while let Some(chunk) = body.next().await {
        if cancel_token.is_cancelled() {
            return Ok(());
        }
        let bytes = chunk?;
        let text = decoder.decode(&bytes);
        for increment in framer.push(&text) {
            let _ = tx.send((StreamMessage::Chunk(increment), stream_id));
        }
    }

    let tail = decoder.finish();
    for increment in framer.finish(&tail) {
        let _ = tx.send((StreamMessage::Chunk(increment), stream_id));
    }
    Ok(())
}
