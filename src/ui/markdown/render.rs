use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::code::{code_block_lines, detab, language_hint_from_codeblock_kind, CodeBlock};
use super::{
    markdown_options, MessageRenderer, RenderedMessage, USER_CONTINUATION_INDENT, USER_PREFIX,
};
use crate::core::message::{Message, Sender};
use crate::ui::theme::Theme;

/// Renders GitHub-flavored markdown. Raw HTML is shown as literal text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MessageRenderer for MarkdownRenderer {
    fn render(&self, message: &Message, theme: &Theme, first_code_block: usize) -> RenderedMessage {
        MarkdownWriter::new(message.sender, theme, first_code_block).write(&message.text)
    }
}

struct ListLevel {
    next_number: Option<u64>,
    marker_width: usize,
}

struct MarkdownWriter<'a> {
    sender: Sender,
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    link_stack: Vec<String>,
    list_stack: Vec<ListLevel>,
    pending_marker: Option<String>,
    quote_depth: usize,
    code_block: Option<(String, String)>,
    code_blocks: Vec<CodeBlock>,
    next_code_block: usize,
    table_cell: usize,
    did_prefix: bool,
}

impl<'a> MarkdownWriter<'a> {
    fn new(sender: Sender, theme: &'a Theme, first_code_block: usize) -> Self {
        Self {
            sender,
            theme,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![theme.text_style(sender)],
            link_stack: Vec::new(),
            list_stack: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            code_block: None,
            code_blocks: Vec::new(),
            next_code_block: first_code_block,
            table_cell: 0,
            did_prefix: false,
        }
    }

    fn write(mut self, content: &str) -> RenderedMessage {
        for event in Parser::new_ext(content, markdown_options()) {
            self.handle(event);
        }
        self.flush_line();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        RenderedMessage {
            lines: self.lines,
            code_blocks: self.code_blocks,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some((_, code)) = self.code_block.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text, self.current_style());
                }
            }
            Event::Code(code) => {
                self.push_span(Span::styled(detab(&code), self.theme.md_inline_code_style));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_text(&html, self.current_style());
            }
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.push_span(Span::styled("─".repeat(24), self.theme.md_codeblock_label_style));
                self.flush_line();
                self.push_blank_line();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::styled(marker, self.theme.md_list_marker_style));
            }
            Event::FootnoteReference(label) => {
                self.push_span(Span::styled(format!("[^{label}]"), self.theme.md_link_style));
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let hashes = "#".repeat(heading_depth(level));
                self.style_stack.push(self.theme.md_heading_style);
                self.push_span(Span::styled(
                    format!("{hashes} "),
                    self.theme.md_heading_style,
                ));
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.style_stack.push(self.theme.md_blockquote_style);
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(ListLevel {
                    next_number: start,
                    marker_width: 2,
                });
            }
            Tag::Item => {
                self.flush_line();
                if let Some(level) = self.list_stack.last_mut() {
                    let marker = match level.next_number.as_mut() {
                        Some(n) => {
                            let marker = format!("{n}. ");
                            *n += 1;
                            marker
                        }
                        None => "- ".to_string(),
                    };
                    level.marker_width = marker.width();
                    self.pending_marker = Some(marker);
                }
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.code_block = Some((language_hint_from_codeblock_kind(&kind), String::new()));
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.link_stack.push(dest_url.to_string());
            }
            Tag::TableHead | Tag::TableRow => {
                self.flush_line();
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push_span(Span::styled(" │ ", self.theme.md_codeblock_label_style));
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.push_blank_line();
                self.style_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_line();
                self.pending_marker = None;
            }
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some(url) = self.link_stack.pop() {
                    let shown = self
                        .current_spans
                        .last()
                        .is_some_and(|span| span.content.as_ref() == url);
                    if !shown && !url.is_empty() {
                        self.push_span(Span::styled(format!(" ({url})"), self.theme.status_style));
                    }
                }
            }
            TagEnd::TableHead => {
                self.flush_line();
                self.push_span(Span::styled("─".repeat(24), self.theme.md_codeblock_label_style));
                self.flush_line();
            }
            TagEnd::TableRow => self.flush_line(),
            TagEnd::Table => {
                self.flush_line();
                self.push_blank_line();
            }
            _ => {}
        }
    }

    fn finish_code_block(&mut self) {
        let Some((language, code)) = self.code_block.take() else {
            return;
        };
        let block = CodeBlock {
            index: self.next_code_block,
            language,
            code: code.trim().to_string(),
        };
        self.next_code_block += 1;
        for line in code_block_lines(&block, self.theme) {
            for span in line.spans {
                self.push_span(span);
            }
            self.flush_line();
        }
        self.code_blocks.push(block);
        if self.list_stack.is_empty() {
            self.push_blank_line();
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.theme.text_style(self.sender))
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    /// Push text that may contain newlines, breaking lines where it does.
    fn push_text(&mut self, text: &str, style: Style) {
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                self.push_span(Span::styled(detab(part), style));
            }
            if parts.peek().is_some() {
                self.flush_line();
            }
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current_spans.is_empty() {
            self.current_spans = self.line_leader();
        }
        self.current_spans.push(span);
    }

    /// Role prefix, quote bars, and list indentation for a new line.
    fn line_leader(&mut self) -> Vec<Span<'static>> {
        let mut leader = Vec::new();
        if self.sender == Sender::User {
            if self.did_prefix {
                leader.push(Span::raw(USER_CONTINUATION_INDENT));
            } else {
                leader.push(Span::styled(USER_PREFIX, self.theme.user_prefix_style));
                self.did_prefix = true;
            }
        }
        if self.quote_depth > 0 {
            leader.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                self.theme.md_blockquote_style,
            ));
        }
        if let Some((current, parents)) = self.list_stack.split_last() {
            let parent_indent: usize = parents.iter().map(|level| level.marker_width).sum();
            if parent_indent > 0 {
                leader.push(Span::raw(" ".repeat(parent_indent)));
            }
            match self.pending_marker.take() {
                Some(marker) => {
                    leader.push(Span::styled(marker, self.theme.md_list_marker_style));
                }
                None => leader.push(Span::raw(" ".repeat(current.marker_width))),
            }
        }
        leader
    }

    fn flush_line(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        self.lines.push(Line::from(spans));
    }

    fn push_blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
