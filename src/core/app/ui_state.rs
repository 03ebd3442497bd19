use std::time::{Duration, Instant};

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct UiState {
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    /// Rows scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
    /// Largest offset the last frame allowed.
    pub max_scroll: u16,
    /// Transcript rows visible in the last frame.
    pub viewport_height: u16,
    pub pulse_start: Instant,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            status: None,
            status_set_at: None,
            scroll_offset: 0,
            max_scroll: 0,
            viewport_height: 0,
            pulse_start: Instant::now(),
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn current_status(&self) -> Option<&str> {
        self.current_status_at(Instant::now())
    }

    pub(crate) fn current_status_at(&self, now: Instant) -> Option<&str> {
        match (&self.status, self.status_set_at) {
            (Some(status), Some(set_at)) if now.duration_since(set_at) < STATUS_TTL => {
                Some(status.as_str())
            }
            _ => None,
        }
    }

    /// Drop an expired status. Returns whether anything changed.
    pub fn expire_status(&mut self) -> bool {
        if self.status.is_some() && self.current_status().is_none() {
            self.status = None;
            self.status_set_at = None;
            return true;
        }
        false
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn page_rows(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }

    /// Record the layout of a drawn frame and clamp the offset to it.
    pub fn update_layout(&mut self, total_rows: usize, viewport_height: u16) {
        let total = u16::try_from(total_rows).unwrap_or(u16::MAX);
        self.viewport_height = viewport_height;
        self.max_scroll = total.saturating_sub(viewport_height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll);
    }

    /// First transcript row shown, counted from the top.
    pub fn top_row(&self) -> u16 {
        self.max_scroll.saturating_sub(self.scroll_offset)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_expires_after_ttl() {
        let mut ui = UiState::new();
        ui.set_status("Copied");
        let set_at = ui.status_set_at.expect("timestamp");
        assert_eq!(ui.current_status_at(set_at), Some("Copied"));
        assert_eq!(ui.current_status_at(set_at + STATUS_TTL), None);
    }

    #[test]
    fn scrolling_is_clamped_to_layout() {
        let mut ui = UiState::new();
        ui.update_layout(50, 20);
        assert_eq!(ui.top_row(), 30);

        ui.scroll_up(100);
        assert_eq!(ui.scroll_offset, 30);
        assert_eq!(ui.top_row(), 0);

        ui.scroll_down(10);
        assert_eq!(ui.top_row(), 10);

        ui.update_layout(10, 20);
        assert_eq!(ui.scroll_offset, 0);
        assert_eq!(ui.top_row(), 0);
    }
}
