//! Word wrapping for styled lines.
//!
//! The transcript is wrapped before it reaches ratatui so that the number of
//! visual rows is known exactly when computing the scroll offset.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

struct LineBuilder {
    out: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    width: usize,
    continuation: bool,
    base_style: Style,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style, text_width: usize) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.width += text_width;
    }

    fn break_line(&mut self) {
        let mut spans = std::mem::take(&mut self.spans);
        if let Some(last) = spans.last_mut() {
            let trimmed = last.content.trim_end().len();
            last.content.to_mut().truncate(trimmed);
        }
        self.out.push(Line::from(spans).style(self.base_style));
        self.width = 0;
        self.continuation = true;
    }
}

/// Wrap one line to `max_width` columns, breaking at whitespace where
/// possible and inside words only when a word is wider than the line.
pub fn wrap_line(line: &Line<'static>, max_width: usize) -> Vec<Line<'static>> {
    if max_width == 0 || line.width() <= max_width {
        return vec![line.clone()];
    }

    let mut builder = LineBuilder {
        out: Vec::new(),
        spans: Vec::new(),
        width: 0,
        continuation: false,
        base_style: line.style,
    };

    for span in &line.spans {
        for (token, is_space) in tokens(&span.content) {
            let token_width = token.width();
            if is_space {
                if builder.continuation && builder.width == 0 {
                    continue;
                }
                if builder.width + token_width > max_width {
                    builder.break_line();
                } else {
                    builder.push(token, span.style, token_width);
                }
            } else if builder.width + token_width <= max_width {
                builder.push(token, span.style, token_width);
            } else if token_width <= max_width {
                builder.break_line();
                builder.push(token, span.style, token_width);
            } else {
                hard_split(&mut builder, token, span.style, max_width);
            }
        }
    }

    if !builder.spans.is_empty() || builder.out.is_empty() {
        builder.break_line();
    }
    builder.out
}

pub fn wrap_lines(lines: &[Line<'static>], max_width: usize) -> Vec<Line<'static>> {
    lines
        .iter()
        .flat_map(|line| wrap_line(line, max_width))
        .collect()
}

fn hard_split(builder: &mut LineBuilder, token: &str, style: Style, max_width: usize) {
    let mut start = 0;
    let mut piece_width = 0;
    for (pos, ch) in token.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if builder.width + piece_width + ch_width > max_width {
            builder.push(&token[start..pos], style, piece_width);
            builder.break_line();
            start = pos;
            piece_width = 0;
        }
        piece_width += ch_width;
    }
    builder.push(&token[start..], style, piece_width);
}

/// Split text into alternating whitespace and non-whitespace runs.
fn tokens(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (pos, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match current {
            Some(kind) if kind != is_space => {
                out.push((&text[start..pos], kind));
                start = pos;
            }
            _ => {}
        }
        current = Some(is_space);
    }
    if let Some(kind) = current {
        out.push((&text[start..], kind));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn short_lines_are_untouched() {
        let line = Line::from("fits");
        assert_eq!(texts(&wrap_line(&line, 10)), vec!["fits"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let line = Line::from("word boundary test");
        assert_eq!(
            texts(&wrap_line(&line, 9)),
            vec!["word", "boundary", "test"]
        );
    }

    #[test]
    fn long_words_are_split() {
        let line = Line::from("abcdefghij");
        assert_eq!(texts(&wrap_line(&line, 4)), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn styles_survive_wrapping() {
        let bold = Style::default().add_modifier(ratatui::style::Modifier::BOLD);
        let line = Line::from(vec![Span::raw("plain "), Span::styled("bold words", bold)]);
        let wrapped = wrap_line(&line, 10);
        assert_eq!(texts(&wrapped), vec!["plain bold", "words"]);
        assert_eq!(wrapped[1].spans[0].style, bold);
    }

    #[test]
    fn wide_characters_count_double() {
        let line = Line::from("日本語のテキスト");
        let wrapped = wrap_line(&line, 6);
        assert!(wrapped.iter().all(|l| l.width() <= 6));
        assert_eq!(wrapped.len(), 3);
    }
}
