use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::core::chat_stream::StreamParams;
use crate::core::framing::WireFormat;
use crate::core::session::ChatSession;
use crate::core::transport::{ChatRequest, ChatTransport, ChunkStream, TransportError};
use crate::utils::clipboard::{Clipboard, ClipboardError};

pub const TEST_ENDPOINT: &str = "http://backend.test/chat";

#[derive(Clone)]
enum Script {
    Body {
        chunks: Vec<Vec<u8>>,
        error: Option<TransportError>,
        hang: bool,
    },
    NoBody,
    Fail(TransportError),
    /// `open` never resolves, like a backend that never answers.
    Unanswered,
}

/// A transport that replays a fixed response and records every request.
pub struct ScriptedTransport {
    script: Script,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn chunks<'a>(chunks: impl IntoIterator<Item = &'a str>) -> Self {
        Self::byte_chunks(chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect())
    }

    pub fn byte_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self::new(Script::Body {
            chunks,
            error: None,
            hang: false,
        })
    }

    pub fn chunks_then_error<'a>(
        chunks: impl IntoIterator<Item = &'a str>,
        error: TransportError,
    ) -> Self {
        Self::new(Script::Body {
            chunks: chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect(),
            error: Some(error),
            hang: false,
        })
    }

    pub fn chunks_then_hang<'a>(chunks: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(Script::Body {
            chunks: chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect(),
            error: None,
            hang: true,
        })
    }

    pub fn no_body() -> Self {
        Self::new(Script::NoBody)
    }

    pub fn failing(error: TransportError) -> Self {
        Self::new(Script::Fail(error))
    }

    pub fn unanswered() -> Self {
        Self::new(Script::Unanswered)
    }

    /// Wait until `count` requests have been opened.
    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests().len() < count {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }

    /// `(endpoint, message)` pairs in the order they were opened.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> Result<Option<ChunkStream>, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((endpoint.to_string(), request.message.clone()));

        match self.script.clone() {
            Script::NoBody => Ok(None),
            Script::Fail(error) => Err(error),
            Script::Unanswered => std::future::pending().await,
            Script::Body {
                chunks,
                error,
                hang,
            } => {
                let body = stream::iter(chunks.into_iter().map(Ok)).chain(stream::iter(error.map(Err)));
                if hang {
                    Ok(Some(body.chain(stream::pending()).boxed()))
                } else {
                    Ok(Some(body.boxed()))
                }
            }
        }
    }
}

/// Clipboard double that remembers what was written.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingClipboard {
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("writes lock").clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Unavailable);
        }
        self.writes.lock().expect("writes lock").push(text.to_string());
        Ok(())
    }
}

pub fn create_test_session(transport: Arc<ScriptedTransport>) -> ChatSession {
    ChatSession::new(transport, TEST_ENDPOINT, WireFormat::Chunked)
}

/// Submit `text`, panicking if the session refuses it.
pub fn submit_ok(session: &mut ChatSession, text: &str) -> StreamParams {
    match session.submit(text) {
        Ok(params) => params,
        Err(err) => panic!("submit of {text:?} was rejected: {err}"),
    }
}
