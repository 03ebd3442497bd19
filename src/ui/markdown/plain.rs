use ratatui::text::{Line, Span};

use super::{MessageRenderer, RenderedMessage, USER_CONTINUATION_INDENT, USER_PREFIX};
use crate::core::message::{Message, Sender};
use crate::ui::theme::Theme;

/// Shows message text verbatim, one terminal line per text line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl MessageRenderer for PlainRenderer {
    fn render(&self, message: &Message, theme: &Theme, _first_code_block: usize) -> RenderedMessage {
        let style = theme.text_style(message.sender);
        let lines = message
            .text
            .lines()
            .enumerate()
            .map(|(i, text)| {
                let text = super::code::detab(text);
                match (message.sender, i) {
                    (Sender::User, 0) => Line::from(vec![
                        Span::styled(USER_PREFIX, theme.user_prefix_style),
                        Span::styled(text, style),
                    ]),
                    (Sender::User, _) => Line::from(vec![
                        Span::raw(USER_CONTINUATION_INDENT),
                        Span::styled(text, style),
                    ]),
                    _ => Line::from(Span::styled(text, style)),
                }
            })
            .collect();

        RenderedMessage {
            lines,
            code_blocks: Vec::new(),
        }
    }
}
