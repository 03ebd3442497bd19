use tracing::debug;

use super::App;
use crate::core::chat_stream::StreamParams;
use crate::core::session::SubmitError;
use crate::ui::keys::UiAction;

/// Work the event loop must carry out after an action is applied.
#[derive(Debug)]
pub enum AppCommand {
    SpawnStream(StreamParams),
    Quit,
}

pub fn apply_action(app: &mut App, action: UiAction) -> Option<AppCommand> {
    match action {
        UiAction::Submit => match app.session.submit_input() {
            Ok(params) => {
                app.ui.scroll_to_bottom();
                app.ui.pulse_start = std::time::Instant::now();
                Some(AppCommand::SpawnStream(params))
            }
            Err(SubmitError::EmptyInput) => None,
            Err(err @ SubmitError::AlreadyGenerating) => {
                debug!(%err, "Submit ignored");
                None
            }
        },
        UiAction::Stop => {
            if app.session.stop() {
                app.ui.scroll_to_bottom();
            }
            None
        }
        UiAction::Quit => {
            app.session.stop();
            Some(AppCommand::Quit)
        }
        UiAction::InsertChar(ch) => {
            app.session.state_mut().push_input_char(ch);
            None
        }
        UiAction::InsertNewline => {
            app.session.state_mut().push_input_char('\n');
            None
        }
        UiAction::Backspace => {
            app.session.state_mut().pop_input_char();
            None
        }
        UiAction::ClearInput => {
            app.session.state_mut().clear_input_buffer();
            None
        }
        UiAction::CopyNewestCode => {
            app.copy_code_block(None);
            None
        }
        UiAction::CopyCode(index) => {
            app.copy_code_block(Some(index));
            None
        }
        UiAction::ScrollUp => {
            app.ui.scroll_up(1);
            None
        }
        UiAction::ScrollDown => {
            app.ui.scroll_down(1);
            None
        }
        UiAction::PageUp => {
            let rows = app.ui.page_rows();
            app.ui.scroll_up(rows);
            None
        }
        UiAction::PageDown => {
            let rows = app.ui.page_rows();
            app.ui.scroll_down(rows);
            None
        }
        UiAction::ScrollToBottom => {
            app.ui.scroll_to_bottom();
            None
        }
    }
}

/// Insert pasted text into the input buffer. Ignored while generating.
pub fn apply_paste(app: &mut App, text: &str) {
    if app.is_generating() {
        return;
    }
    let state = app.session.state_mut();
    for ch in text.chars().filter(|ch| *ch != '\r') {
        state.push_input_char(ch);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::chat_stream::StreamMessage;
    use crate::core::message::STOPPED_BY_USER_NOTICE;
    use crate::ui::markdown::{MarkdownRenderer, PlainRenderer};
    use crate::ui::theme::Theme;
    use crate::utils::test_utils::{create_test_session, RecordingClipboard, ScriptedTransport};

    fn app_with(clipboard: Arc<RecordingClipboard>) -> App {
        App::new(
            create_test_session(Arc::new(ScriptedTransport::no_body())),
            Box::new(MarkdownRenderer),
            Theme::monochrome(),
            clipboard,
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            apply_action(app, UiAction::InsertChar(ch));
        }
    }

    fn stream_reply(app: &mut App, reply: &str) {
        type_text(app, "question");
        let Some(AppCommand::SpawnStream(params)) = apply_action(app, UiAction::Submit) else {
            panic!("submit should spawn a stream");
        };
        app.session
            .apply(StreamMessage::Chunk(reply.to_string()), params.stream_id);
        app.session.apply(StreamMessage::End, params.stream_id);
    }

    #[test]
    fn submit_spawns_stream_and_clears_input() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        type_text(&mut app, "hi");
        let command = apply_action(&mut app, UiAction::Submit);
        assert!(matches!(command, Some(AppCommand::SpawnStream(ref p)) if p.message == "hi"));
        assert!(app.session.state().input_buffer().is_empty());
        assert!(app.is_generating());
    }

    #[test]
    fn blank_submit_does_nothing() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        type_text(&mut app, "   ");
        assert!(apply_action(&mut app, UiAction::Submit).is_none());
        assert!(app.session.state().is_empty());
    }

    #[test]
    fn stop_action_appends_stop_notice() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        type_text(&mut app, "ping");
        apply_action(&mut app, UiAction::Submit);
        apply_action(&mut app, UiAction::Stop);
        let last = app.session.state().last_message().expect("notice");
        assert_eq!(last.text, STOPPED_BY_USER_NOTICE);
        assert!(!app.is_generating());
    }

    #[test]
    fn copy_newest_and_numbered_code_blocks() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let mut app = app_with(clipboard.clone());
        stream_reply(&mut app, "```sh\necho one\n```");
        stream_reply(&mut app, "```\n  two  \n```");

        apply_action(&mut app, UiAction::CopyNewestCode);
        apply_action(&mut app, UiAction::CopyCode(1));
        assert_eq!(clipboard.writes(), vec!["two".to_string(), "echo one".to_string()]);
        assert_eq!(app.ui.current_status(), Some("Copied code block [1]"));
    }

    #[test]
    fn copy_failure_only_sets_status() {
        let mut app = app_with(Arc::new(RecordingClipboard::failing()));
        stream_reply(&mut app, "```\ncode\n```");
        let messages_before = app.session.state().len();

        apply_action(&mut app, UiAction::CopyNewestCode);

        assert_eq!(app.session.state().len(), messages_before);
        assert!(app
            .ui
            .current_status()
            .is_some_and(|status| status.starts_with("Copy failed")));
    }

    #[test]
    fn copy_with_no_blocks_reports_status() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        apply_action(&mut app, UiAction::CopyCode(2));
        assert_eq!(app.ui.current_status(), Some("No code block [2]"));
    }

    #[test]
    fn plain_rendering_offers_nothing_to_copy() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let mut app = App::new(
            create_test_session(Arc::new(ScriptedTransport::no_body())),
            Box::new(PlainRenderer),
            Theme::monochrome(),
            clipboard.clone(),
        );
        stream_reply(&mut app, "```\ncode\n```");
        apply_action(&mut app, UiAction::CopyNewestCode);
        assert!(clipboard.writes().is_empty());
    }

    #[test]
    fn transcript_skips_empty_placeholder() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        type_text(&mut app, "hello");
        apply_action(&mut app, UiAction::Submit);
        let lines: Vec<String> = app
            .build_transcript()
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect();
        assert_eq!(lines, vec!["You: hello"]);
    }

    #[test]
    fn paste_is_ignored_while_generating() {
        let mut app = app_with(Arc::new(RecordingClipboard::default()));
        apply_paste(&mut app, "line one\r\nline two");
        assert_eq!(app.session.state().input_buffer(), "line one\nline two");

        apply_action(&mut app, UiAction::Submit);
        apply_paste(&mut app, "more");
        assert!(app.session.state().input_buffer().is_empty());
    }
}
