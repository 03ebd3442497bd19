use ratatui::style::{Color, Modifier, Style};

use crate::core::message::Sender;

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_text_style: Style,
    pub system_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub thinking_style: Style,
    pub status_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_disabled_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_inline_code_style: Style,
    pub md_codeblock_style: Style,
    pub md_codeblock_label_style: Style,
    pub md_blockquote_style: Style,
    pub md_list_marker_style: Style,
    pub md_link_style: Style,
}

impl Theme {
    /// Dark palette modeled on the GitHub dark colors the web client used.
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Rgb(0x0d, 0x11, 0x17),
            user_prefix_style: Style::default()
                .fg(Color::Rgb(0x3f, 0xb9, 0x50))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0x7e, 0xe7, 0x87)),
            bot_text_style: Style::default().fg(Color::Rgb(0xe6, 0xed, 0xf3)),
            system_text_style: Style::default()
                .fg(Color::Rgb(0x8b, 0x94, 0x9e))
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default()
                .fg(Color::Rgb(0xe6, 0xed, 0xf3))
                .add_modifier(Modifier::BOLD),
            thinking_style: Style::default().fg(Color::Rgb(0xd2, 0x99, 0x22)),
            status_style: Style::default().fg(Color::Rgb(0x8b, 0x94, 0x9e)),
            input_border_style: Style::default().fg(Color::Rgb(0x30, 0x36, 0x3d)),
            input_title_style: Style::default().fg(Color::Rgb(0x8b, 0x94, 0x9e)),
            input_text_style: Style::default().fg(Color::Rgb(0xe6, 0xed, 0xf3)),
            input_disabled_style: Style::default()
                .fg(Color::Rgb(0x48, 0x4f, 0x58))
                .add_modifier(Modifier::DIM),

            md_heading_style: Style::default()
                .fg(Color::Rgb(0x58, 0xa6, 0xff))
                .add_modifier(Modifier::BOLD),
            md_inline_code_style: Style::default()
                .fg(Color::Rgb(0xff, 0xa6, 0x57))
                .bg(Color::Rgb(0x30, 0x36, 0x3d)),
            md_codeblock_style: Style::default()
                .fg(Color::Rgb(0xc9, 0xd1, 0xd9))
                .bg(Color::Rgb(0x16, 0x1b, 0x22)),
            md_codeblock_label_style: Style::default().fg(Color::Rgb(0x8b, 0x94, 0x9e)),
            md_blockquote_style: Style::default()
                .fg(Color::Rgb(0x8b, 0x94, 0x9e))
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::Rgb(0x58, 0xa6, 0xff)),
            md_link_style: Style::default()
                .fg(Color::Rgb(0x58, 0xa6, 0xff))
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    /// Plain terminal palette for terminals without truecolor.
    pub fn monochrome() -> Self {
        Theme {
            background_color: Color::Reset,
            user_prefix_style: Style::default().add_modifier(Modifier::BOLD),
            user_text_style: Style::default(),
            bot_text_style: Style::default(),
            system_text_style: Style::default().add_modifier(Modifier::DIM),

            title_style: Style::default().add_modifier(Modifier::BOLD),
            thinking_style: Style::default().add_modifier(Modifier::ITALIC),
            status_style: Style::default().add_modifier(Modifier::DIM),
            input_border_style: Style::default(),
            input_title_style: Style::default(),
            input_text_style: Style::default(),
            input_disabled_style: Style::default().add_modifier(Modifier::DIM),

            md_heading_style: Style::default().add_modifier(Modifier::BOLD),
            md_inline_code_style: Style::default().add_modifier(Modifier::REVERSED),
            md_codeblock_style: Style::default(),
            md_codeblock_label_style: Style::default().add_modifier(Modifier::DIM),
            md_blockquote_style: Style::default().add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default(),
            md_link_style: Style::default().add_modifier(Modifier::UNDERLINED),
        }
    }

    /// Honors `NO_COLOR`.
    pub fn from_env() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            Self::monochrome()
        } else {
            Self::dark_default()
        }
    }

    pub fn text_style(&self, sender: Sender) -> Style {
        match sender {
            Sender::User => self.user_text_style,
            Sender::Bot => self.bot_text_style,
            Sender::System => self.system_text_style,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
