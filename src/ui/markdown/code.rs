use pulldown_cmark::CodeBlockKind;
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

/// A fenced or indented code block found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based position across the whole transcript.
    pub index: usize,
    /// Info-string language, empty when none was given.
    pub language: String,
    /// Block text with surrounding whitespace trimmed, as it is copied.
    pub code: String,
}

pub(super) fn language_hint_from_codeblock_kind(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

/// Header, body, and footer lines for one code block.
pub(super) fn code_block_lines(block: &CodeBlock, theme: &Theme) -> Vec<Line<'static>> {
    let label = if block.language.is_empty() {
        format!("┌─ [{}] code", block.index)
    } else {
        format!("┌─ [{}] {}", block.index, block.language)
    };
    let hint = if block.index <= 9 {
        format!("  Alt+{} to copy", block.index)
    } else {
        String::new()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(label, theme.md_codeblock_label_style),
        Span::styled(hint, theme.status_style),
    ])];
    for code_line in block.code.lines() {
        lines.push(Line::from(vec![
            Span::styled("│ ", theme.md_codeblock_label_style),
            Span::styled(detab(code_line), theme.md_codeblock_style),
        ]));
    }
    lines.push(Line::from(Span::styled("└─", theme.md_codeblock_label_style)));
    lines
}

pub(super) fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}
