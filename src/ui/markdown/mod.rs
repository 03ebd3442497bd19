//! Message rendering strategies.
//!
//! A [`MessageRenderer`] turns one transcript message into styled terminal
//! lines plus the code blocks it exposes for copying. The markdown renderer
//! understands GitHub-flavored markdown; the plain renderer shows text as is.

mod code;
mod plain;
mod render;


use pulldown_cmark::Options;
use ratatui::text::Line;

use crate::core::message::Message;
use crate::ui::theme::Theme;

pub use code::CodeBlock;
pub use plain::PlainRenderer;
pub use render::MarkdownRenderer;

/// Output of rendering one message.
#[derive(Debug, Clone, Default)]
pub struct RenderedMessage {
    pub lines: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlock>,
}

pub trait MessageRenderer: Send + Sync {
    /// Render `message`. Code blocks are numbered starting at
    /// `first_code_block`.
    fn render(&self, message: &Message, theme: &Theme, first_code_block: usize)
        -> RenderedMessage;
}

pub fn renderer_for(markdown: bool) -> Box<dyn MessageRenderer> {
    if markdown {
        Box::new(MarkdownRenderer)
    } else {
        Box::new(PlainRenderer)
    }
}

pub(crate) fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_GFM);
    options
}

/// Prefix shown before the first line of a user message.
pub(crate) const USER_PREFIX: &str = "You: ";
/// Indent for the remaining lines of a user message.
pub(crate) const USER_CONTINUATION_INDENT: &str = "     ";
