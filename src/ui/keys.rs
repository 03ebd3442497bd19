//! Keyboard mapping for the chat view.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Submit,
    Stop,
    Quit,
    InsertChar(char),
    InsertNewline,
    Backspace,
    ClearInput,
    /// Copy the most recent code block in the transcript.
    CopyNewestCode,
    /// Copy code block `n` (1-based).
    CopyCode(usize),
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToBottom,
}

impl UiAction {
    /// Actions that edit or send input are disabled while a reply streams.
    pub fn edits_input(self) -> bool {
        matches!(
            self,
            UiAction::Submit
                | UiAction::InsertChar(_)
                | UiAction::InsertNewline
                | UiAction::Backspace
                | UiAction::ClearInput
        )
    }
}

/// Map a key press to an action. Returns `None` for unbound keys and for
/// input edits while `generating`.
pub fn map_key(key: KeyEvent, generating: bool) -> Option<UiAction> {
    let action = resolve(key)?;
    if generating && action.edits_input() {
        return None;
    }
    Some(action)
}

fn resolve(key: KeyEvent) -> Option<UiAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') if ctrl => Some(UiAction::Quit),
        KeyCode::Char('y') if ctrl => Some(UiAction::CopyNewestCode),
        KeyCode::Char('u') if ctrl => Some(UiAction::ClearInput),
        KeyCode::Char(digit @ '1'..='9') if alt => {
            digit.to_digit(10).map(|n| UiAction::CopyCode(n as usize))
        }
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(ch) => Some(UiAction::InsertChar(ch)),
        KeyCode::Enter if alt || shift => Some(UiAction::InsertNewline),
        KeyCode::Enter => Some(UiAction::Submit),
        KeyCode::Esc => Some(UiAction::Stop),
        KeyCode::Backspace => Some(UiAction::Backspace),
        KeyCode::Up => Some(UiAction::ScrollUp),
        KeyCode::Down => Some(UiAction::ScrollDown),
        KeyCode::PageUp => Some(UiAction::PageUp),
        KeyCode::PageDown => Some(UiAction::PageDown),
        KeyCode::End if ctrl => Some(UiAction::ScrollToBottom),
        _ => None,
    }
}
