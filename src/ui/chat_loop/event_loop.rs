//! Event polling, stream delivery, and redraws.
//!
//! The loop owns the [`App`] outright. Terminal input arrives from a reader
//! task over one channel and stream output from [`ChatStreamService`] over
//! another; both are drained every tick before the next frame is drawn.

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::app::{apply_action, apply_paste, App, AppCommand};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::config::data::ResolvedSettings;
use crate::core::session::ChatSession;
use crate::core::transport::{ChatTransport, HttpTransport};
use crate::ui::keys::map_key;
use crate::ui::markdown::renderer_for;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::clipboard::SystemClipboard;

use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Next terminal event, or `None` when nothing arrived within the poll window.
fn poll_terminal_event() -> std::io::Result<Option<Event>> {
    if event::poll(Duration::from_millis(10))? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn spawn_event_reader<S>(
    mut next_event: S,
    event_tx: mpsc::UnboundedSender<UiEvent>,
) -> tokio::task::JoinHandle<()>
where
    S: FnMut() -> std::io::Result<Option<Event>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match next_event() {
                Ok(Some(ev)) => {
                    if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                        break;
                    }
                }
                Ok(None) => tokio::task::yield_now().await,
                Err(err) => {
                    debug!(%err, "Skipping unreadable terminal event");
                    tokio::task::yield_now().await;
                }
            }
        }
    })
}

pub async fn run_chat(settings: ResolvedSettings) -> Result<(), Box<dyn Error>> {
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new());
    let session = ChatSession::new(transport, settings.endpoint.clone(), settings.wire_format);
    let mut app = App::new(
        session,
        renderer_for(settings.markdown),
        Theme::from_env(),
        Arc::new(SystemClipboard),
    );
    debug!(endpoint = %settings.endpoint, wire_format = %settings.wire_format, "Starting chat");

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app).await;
    let restored = restore_terminal(&mut terminal);
    result?;
    restored
}

async fn run_event_loop(
    terminal: &mut ChatTerminal,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let (stream_service, mut rx) = ChatStreamService::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(poll_terminal_event, event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = 'main_loop: loop {
        if request_redraw && last_draw.elapsed() >= frame_duration {
            if let Err(err) = terminal.draw(|f| ui(f, app)) {
                break 'main_loop Err(err.into());
            }
            last_draw = Instant::now();
            request_redraw = false;
        }

        let mut events_processed = false;
        while let Ok(ev) = event_rx.try_recv() {
            events_processed = true;
            match ev {
                UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let Some(action) = map_key(key, app.is_generating()) else {
                        continue;
                    };
                    match apply_action(app, action) {
                        Some(AppCommand::SpawnStream(params)) => {
                            stream_service.spawn_stream(params);
                        }
                        Some(AppCommand::Quit) => break 'main_loop Ok(()),
                        None => {}
                    }
                }
                UiEvent::Crossterm(Event::Paste(text)) => apply_paste(app, &text),
                UiEvent::Crossterm(_) => {}
            }
        }
        if events_processed {
            request_redraw = true;
        }

        let received_any = process_stream_updates(app, &mut rx);
        if received_any {
            request_redraw = true;
        }

        if app.is_generating() || app.ui.expire_status() {
            request_redraw = true;
        }

        if !events_processed && !received_any {
            tokio::time::sleep(frame_duration).await;
        }
    };

    app.session.stop();
    event_reader_handle.abort();
    result
}

/// Apply everything the stream tasks have queued. Returns whether anything
/// arrived.
fn process_stream_updates(
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> bool {
    let mut received_any = false;
    while let Ok((message, stream_id)) = rx.try_recv() {
        app.session.apply(message, stream_id);
        received_any = true;
    }
    received_any
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    #[tokio::test]
    async fn reader_keeps_forwarding_after_a_read_error() {
        let key = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        let mut script: VecDeque<io::Result<Option<Event>>> = VecDeque::from([
            Err(io::Error::other("garbled escape sequence")),
            Ok(None),
            Ok(Some(key.clone())),
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_event_reader(move || script.pop_front().unwrap_or(Ok(None)), tx);

        let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event within timeout")
            .expect("reader alive");
        assert!(matches!(received, UiEvent::Crossterm(ev) if ev == key));
        handle.abort();
    }

    #[tokio::test]
    async fn reader_stops_when_the_loop_goes_away() {
        let key = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = spawn_event_reader(move || Ok(Some(key.clone())), tx);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reader exits")
            .expect("reader task");
    }
}
