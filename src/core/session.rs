//! One conversation and the reply currently being generated for it.
//!
//! [`ChatSession`] is driven from a single loop. [`ChatSession::submit`]
//! mutates the transcript and hands back the [`StreamParams`] for the caller
//! to spawn through [`ChatStreamService`](crate::core::chat_stream::ChatStreamService);
//! everything the stream task produces comes back through
//! [`ChatSession::apply`], tagged with the stream id it was started under.
//! Output tagged with any other id is dropped, which is what keeps a stopped
//! reply from growing after the user has moved on.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::chat_stream::{FailureCause, StreamMessage, StreamParams};
use crate::core::conversation::ConversationState;
use crate::core::framing::WireFormat;
use crate::core::message::{Message, GENERATION_FAILED_NOTICE, STOPPED_BY_USER_NOTICE};
use crate::core::transport::ChatTransport;

/// How a generation ended, when it did not end normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    CancelledByUser,
    Failed(FailureCause),
}

impl GenerationError {
    /// The system message appended to the transcript.
    pub fn notice(&self) -> &'static str {
        match self {
            GenerationError::CancelledByUser => STOPPED_BY_USER_NOTICE,
            GenerationError::Failed(_) => GENERATION_FAILED_NOTICE,
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::CancelledByUser => f.write_str("generation stopped by user"),
            GenerationError::Failed(cause) => write!(f, "generation failed: {cause}"),
        }
    }
}

impl StdError for GenerationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    EmptyInput,
    AlreadyGenerating,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyInput => f.write_str("nothing to send"),
            SubmitError::AlreadyGenerating => f.write_str("a reply is already being generated"),
        }
    }
}

impl StdError for SubmitError {}

struct ActiveGeneration {
    stream_id: u64,
    cancel_token: CancellationToken,
    accumulator: String,
}

pub struct ChatSession {
    state: ConversationState,
    transport: Arc<dyn ChatTransport>,
    endpoint: String,
    wire_format: WireFormat,
    active: Option<ActiveGeneration>,
    last_stream_id: u64,
}

impl ChatSession {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        endpoint: impl Into<String>,
        wire_format: WireFormat,
    ) -> Self {
        Self {
            state: ConversationState::new(),
            transport,
            endpoint: endpoint.into(),
            wire_format,
            active: None,
            last_stream_id: 0,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ConversationState {
        &mut self.state
    }

    pub fn is_generating(&self) -> bool {
        self.state.is_generating()
    }

    /// Id of the generation in flight, if any.
    pub fn active_stream_id(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.stream_id)
    }

    /// Send whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Result<StreamParams, SubmitError> {
        let text = self.state.input_buffer().to_string();
        self.submit(&text)
    }

    /// Start a new generation for `user_text`.
    ///
    /// On success the transcript has grown by the user message and an empty
    /// bot placeholder, the input buffer is cleared, and the returned params
    /// describe the request still to be spawned.
    pub fn submit(&mut self, user_text: &str) -> Result<StreamParams, SubmitError> {
        if user_text.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.active.is_some() || self.state.is_generating() {
            debug!("Ignoring submit while a reply is being generated");
            return Err(SubmitError::AlreadyGenerating);
        }

        self.state.append_message(Message::user(user_text));
        self.state.clear_input_buffer();
        self.state.set_generating(true);
        self.state.append_message(Message::bot_placeholder());

        self.last_stream_id += 1;
        let stream_id = self.last_stream_id;
        let cancel_token = CancellationToken::new();
        self.active = Some(ActiveGeneration {
            stream_id,
            cancel_token: cancel_token.clone(),
            accumulator: String::new(),
        });

        Ok(StreamParams {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            wire_format: self.wire_format,
            message: user_text.to_string(),
            cancel_token,
            stream_id,
        })
    }

    /// Stop the generation in flight. Returns `false` when there was nothing
    /// to stop.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel_token.cancel();
        debug!(stream_id = active.stream_id, "Generation stopped by user");
        self.end_generation(Err(GenerationError::CancelledByUser));
        true
    }

    /// Apply one message from a stream task. Returns whether the transcript
    /// changed.
    pub fn apply(&mut self, message: StreamMessage, stream_id: u64) -> bool {
        let Some(active) = self.active.as_mut() else {
            debug!(stream_id, "Dropping stream output with no generation in flight");
            return false;
        };
        if active.stream_id != stream_id {
            debug!(
                stream_id,
                active = active.stream_id,
                "Dropping output from a retired stream"
            );
            return false;
        }

        match message {
            StreamMessage::Chunk(increment) => {
                active.accumulator.push_str(&increment);
                if !self.state.update_last_message(&active.accumulator) {
                    warn!(stream_id, "Stream chunk arrived with an empty transcript");
                }
                true
            }
            StreamMessage::End => {
                self.active = None;
                self.end_generation(Ok(()));
                true
            }
            StreamMessage::Error(cause) => {
                self.active = None;
                self.end_generation(Err(GenerationError::Failed(cause)));
                true
            }
        }
    }

    fn end_generation(&mut self, outcome: Result<(), GenerationError>) {
        if let Err(err) = outcome {
            if let GenerationError::Failed(cause) = &err {
                warn!(%cause, "Generation failed");
            }
            self.state.append_message(Message::system(err.notice()));
        }
        self.state.set_generating(false);
    }
}
