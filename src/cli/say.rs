//! TUI-less "say" command

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::warn;

use crate::core::chat_stream::ChatStreamService;
use crate::core::config::data::ResolvedSettings;
use crate::core::message::Sender;
use crate::core::session::ChatSession;
use crate::core::transport::HttpTransport;

/// How a one-shot reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SayOutcome {
    Completed,
    Stopped,
    Failed,
}

pub async fn run_say(prompt: Vec<String>, settings: ResolvedSettings) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: llamabot say <prompt>");
        std::process::exit(1);
    }

    let transport = Arc::new(HttpTransport::new());
    let mut session = ChatSession::new(transport, settings.endpoint, settings.wire_format);

    let ctrl_c = interrupt_or_never(tokio::signal::ctrl_c());
    let mut stdout = io::stdout();
    let outcome = stream_reply(&mut session, &prompt, ctrl_c, &mut stdout).await?;

    if let Some(notice) = session.state().last_message().filter(|m| m.is_system()) {
        match outcome {
            SayOutcome::Failed => eprintln!("{}", notice.text),
            _ => println!("{}", notice.text),
        }
    }
    if outcome == SayOutcome::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolves when `signal` fires. A signal that could not be registered never
/// resolves, so the reply runs to completion instead of stopping at once.
async fn interrupt_or_never<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(%err, "Unable to listen for Ctrl+C; the reply cannot be interrupted");
        std::future::pending::<()>().await;
    }
}

/// Stream the reply to `prompt` into `out` as it arrives. Resolving `stop`
/// stops the generation.
pub async fn stream_reply<W, F>(
    session: &mut ChatSession,
    prompt: &str,
    stop: F,
    out: &mut W,
) -> Result<SayOutcome, Box<dyn Error>>
where
    W: Write,
    F: Future<Output = ()>,
{
    let params = session.submit(prompt)?;
    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(params);

    tokio::pin!(stop);
    let mut printed = 0usize;
    let mut outcome = SayOutcome::Completed;

    while session.is_generating() {
        tokio::select! {
            _ = &mut stop => {
                session.stop();
                outcome = SayOutcome::Stopped;
            }
            next = rx.recv() => {
                let Some((message, stream_id)) = next else {
                    break;
                };
                session.apply(message, stream_id);
            }
        }

        if let Some(reply) = session
            .state()
            .messages()
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Bot)
        {
            if reply.text.len() > printed {
                out.write_all(reply.text[printed..].as_bytes())?;
                out.flush()?;
                printed = reply.text.len();
            }
        }
    }

    if printed > 0 {
        writeln!(out)?;
    }

    let failed = outcome == SayOutcome::Completed
        && session
            .state()
            .last_message()
            .is_some_and(|m| m.is_system());
    if failed {
        outcome = SayOutcome::Failed;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::core::message::{GENERATION_FAILED_NOTICE, STOPPED_BY_USER_NOTICE};
    use crate::utils::test_utils::{create_test_session, ScriptedTransport};

    #[tokio::test]
    async fn prints_increments_as_they_arrive() {
        let mut session = create_test_session(Arc::new(ScriptedTransport::chunks([
            r#"{"response":"Hel"}"#,
            r#"{"response":"lo"}"#,
        ])));
        let mut out = Vec::new();

        let outcome = stream_reply(&mut session, "hi", std::future::pending(), &mut out)
            .await
            .expect("say");

        assert_eq!(outcome, SayOutcome::Completed);
        assert_eq!(String::from_utf8(out).expect("utf8"), "Hello\n");
    }

    #[tokio::test]
    async fn stop_keeps_partial_output_and_appends_notice() {
        let mut session =
            create_test_session(Arc::new(ScriptedTransport::chunks_then_hang(["part"])));
        let mut out = Vec::new();

        let outcome = stream_reply(
            &mut session,
            "hi",
            tokio::time::sleep(Duration::from_millis(100)),
            &mut out,
        )
        .await
        .expect("say");

        assert_eq!(outcome, SayOutcome::Stopped);
        assert_eq!(String::from_utf8(out).expect("utf8"), "part\n");
        assert_eq!(
            session.state().last_message().expect("notice").text,
            STOPPED_BY_USER_NOTICE
        );
    }

    #[tokio::test]
    async fn missing_body_is_reported_as_failure() {
        let mut session = create_test_session(Arc::new(ScriptedTransport::no_body()));
        let mut out = Vec::new();

        let outcome = stream_reply(&mut session, "x", std::future::pending(), &mut out)
            .await
            .expect("say");

        assert_eq!(outcome, SayOutcome::Failed);
        assert!(out.is_empty());
        assert_eq!(
            session.state().last_message().expect("notice").text,
            GENERATION_FAILED_NOTICE
        );
    }

    #[tokio::test]
    async fn unregistered_interrupt_never_stops_the_reply() {
        let mut session = create_test_session(Arc::new(ScriptedTransport::chunks(["whole reply"])));
        let mut out = Vec::new();
        let stop = interrupt_or_never(async { Err(io::Error::other("no signal handler")) });

        let outcome = stream_reply(&mut session, "hi", stop, &mut out)
            .await
            .expect("say");

        assert_eq!(outcome, SayOutcome::Completed);
        assert_eq!(String::from_utf8(out).expect("utf8"), "whole reply\n");
    }

    #[tokio::test]
    async fn failed_interrupt_registration_stays_pending() {
        let stop = interrupt_or_never(async { Err(io::Error::other("no signal handler")) });
        assert!(tokio::time::timeout(Duration::from_millis(50), stop)
            .await
            .is_err());
        let fired = interrupt_or_never(async { Ok(()) });
        assert!(tokio::time::timeout(Duration::from_millis(50), fired)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let mut session = create_test_session(Arc::new(ScriptedTransport::no_body()));
        let mut out = Vec::new();
        assert!(stream_reply(&mut session, "  ", std::future::pending(), &mut out)
            .await
            .is_err());
    }
}
