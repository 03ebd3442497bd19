use ratatui::{
    layout::{Constraint, Direction, Layout, Position},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::App;
use crate::ui::wrap::wrap_lines;

pub const TITLE: &str = "🦙 LlamaBot";
pub const THINKING: &str = "🤖 Thinking...";

/// Input rows shown before the box starts scrolling.
const MAX_INPUT_ROWS: u16 = 5;

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_color)),
        area,
    );

    let input_rows = app
        .session
        .state()
        .input_buffer()
        .split('\n')
        .count()
        .clamp(1, MAX_INPUT_ROWS as usize) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(input_rows + 2), // +2 for borders
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(TITLE, app.theme.title_style))),
        chunks[0],
    );

    let transcript = app.build_transcript();
    let rows = wrap_lines(&transcript.lines, chunks[1].width as usize);
    app.ui.update_layout(rows.len(), chunks[1].height);
    f.render_widget(
        Paragraph::new(rows).scroll((app.ui.top_row(), 0)),
        chunks[1],
    );

    f.render_widget(Paragraph::new(indicator_line(app)), chunks[2]);

    render_input(f, app, chunks[3], input_rows);
}

fn indicator_line(app: &App) -> Line<'static> {
    if app.is_generating() {
        Line::from(vec![
            Span::styled(THINKING, app.theme.thinking_style),
            Span::styled(format!(" {}", pulse_symbol(app)), app.theme.thinking_style),
        ])
    } else if let Some(status) = app.ui.current_status() {
        Line::from(Span::styled(status.to_string(), app.theme.status_style))
    } else if app.ui.scroll_offset > 0 {
        Line::from(Span::styled(
            format!("↑ {} rows up (Ctrl+End for latest)", app.ui.scroll_offset),
            app.theme.status_style,
        ))
    } else {
        Line::default()
    }
}

fn pulse_symbol(app: &App) -> &'static str {
    let elapsed = app.ui.pulse_start.elapsed().as_millis() as f32 / 1000.0;
    let pulse_phase = (elapsed * 2.0) % 2.0;
    let pulse_intensity = if pulse_phase < 1.0 {
        pulse_phase
    } else {
        2.0 - pulse_phase
    };
    if pulse_intensity < 0.33 {
        "○"
    } else if pulse_intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

fn render_input(f: &mut Frame, app: &App, area: ratatui::layout::Rect, input_rows: u16) {
    let generating = app.is_generating();
    let (title, text_style) = if generating {
        (
            "Generating (Esc to stop, Ctrl+Y to copy code, Ctrl+C to quit)",
            app.theme.input_disabled_style,
        )
    } else {
        (
            "Message (Enter to send, Alt+Enter for new line, Ctrl+Y/Alt+1-9 to copy code, Ctrl+C to quit)",
            app.theme.input_text_style,
        )
    };

    let input = app.session.state().input_buffer();
    let line_count = input.split('\n').count() as u16;
    let scroll = line_count.saturating_sub(input_rows);

    let widget = Paragraph::new(input.to_string())
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.input_border_style)
                .title(Span::styled(title, app.theme.input_title_style)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(widget, area);

    if !generating {
        let last_line = input.rsplit('\n').next().unwrap_or("");
        let inner_width = area.width.saturating_sub(2);
        let col = (last_line.width() as u16).min(inner_width.saturating_sub(1));
        let row = (line_count - 1 - scroll).min(input_rows.saturating_sub(1));
        f.set_cursor_position(Position::new(area.x + 1 + col, area.y + 1 + row));
    }
}
