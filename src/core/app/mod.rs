//! Interactive chat state: the session plus everything the terminal view
//! needs to draw it.

use std::sync::Arc;

use ratatui::text::Line;

use crate::core::session::ChatSession;
use crate::ui::markdown::{CodeBlock, MessageRenderer};
use crate::ui::theme::Theme;
use crate::utils::clipboard::Clipboard;

pub mod actions;
pub mod ui_state;

pub use actions::{apply_action, apply_paste, AppCommand};
pub use ui_state::UiState;

/// The rendered conversation.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlock>,
}

pub struct App {
    pub session: ChatSession,
    pub ui: UiState,
    pub theme: Theme,
    renderer: Box<dyn MessageRenderer>,
    clipboard: Arc<dyn Clipboard>,
}

impl App {
    pub fn new(
        session: ChatSession,
        renderer: Box<dyn MessageRenderer>,
        theme: Theme,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            session,
            ui: UiState::new(),
            theme,
            renderer,
            clipboard,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.session.is_generating()
    }

    /// Render every message, numbering code blocks across the transcript.
    ///
    /// The bot placeholder is skipped while it is still empty; the thinking
    /// indicator stands in for it.
    pub fn build_transcript(&self) -> Transcript {
        let mut transcript = Transcript::default();
        for message in self.session.state().messages() {
            if message.is_bot() && message.text.is_empty() {
                continue;
            }
            let first_block = transcript.code_blocks.len() + 1;
            let rendered = self.renderer.render(message, &self.theme, first_block);
            if rendered.lines.is_empty() {
                continue;
            }
            if !transcript.lines.is_empty() {
                transcript.lines.push(Line::default());
            }
            transcript.lines.extend(rendered.lines);
            transcript.code_blocks.extend(rendered.code_blocks);
        }
        transcript
    }

    /// Copy code block `index` (1-based), or the newest one when `None`.
    /// The outcome is reported on the status line only.
    pub fn copy_code_block(&mut self, index: Option<usize>) {
        let blocks = self.build_transcript().code_blocks;
        let block = match index {
            Some(n) => blocks.iter().find(|block| block.index == n),
            None => blocks.last(),
        };
        let Some(block) = block else {
            let message = match index {
                Some(n) => format!("No code block [{n}]"),
                None => "No code blocks to copy".to_string(),
            };
            self.ui.set_status(message);
            return;
        };

        match self.clipboard.write_text(&block.code) {
            Ok(()) => self.ui.set_status(format!("Copied code block [{}]", block.index)),
            Err(err) => {
                tracing::warn!(%err, index = block.index, "Clipboard copy failed");
                self.ui.set_status(format!("Copy failed: {err}"));
            }
        }
    }
}
