//! Browser view state: cursors, focus and the star picker.
//!
//! Session data lives in the coordinator; this only tracks what the
//! terminal view needs on top of it.

/// Identifies which pane is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    /// Search results list.
    Results,
    /// Watched list.
    Watched,
}

/// Input mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Query text input mode.
    Search,
}

/// State for the browser TUI.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ViewState {
    /// Active pane.
    pub active_pane: ActivePane,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Cursor position in the results list.
    pub results_cursor: usize,
    /// Cursor position in the watched list.
    pub watched_cursor: usize,
    /// Stars picked for the open title (0 = none picked).
    pub stars: u8,
    /// Whether the results box is expanded.
    pub results_open: bool,
    /// Whether the watched box is expanded.
    pub watched_open: bool,
    /// One-line status message.
    pub status: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_pane: ActivePane::Results,
            input_mode: InputMode::Normal,
            results_cursor: 0,
            watched_cursor: 0,
            stars: 0,
            results_open: true,
            watched_open: true,
            status: None,
        }
    }
}

impl ViewState {
    /// Creates the initial view state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor up in the active pane.
    pub const fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Results => self.results_cursor = self.results_cursor.saturating_sub(1),
            ActivePane::Watched => self.watched_cursor = self.watched_cursor.saturating_sub(1),
        }
    }

    /// Moves the cursor down in the active pane, which holds `len` rows.
    pub const fn move_down(&mut self, len: usize) {
        let cursor = match self.active_pane {
            ActivePane::Results => &mut self.results_cursor,
            ActivePane::Watched => &mut self.watched_cursor,
        };
        if cursor.saturating_add(1) < len {
            *cursor = cursor.saturating_add(1);
        }
    }

    /// Keeps both cursors inside their lists.
    pub fn clamp(&mut self, results_len: usize, watched_len: usize) {
        self.results_cursor = self.results_cursor.min(results_len.saturating_sub(1));
        self.watched_cursor = self.watched_cursor.min(watched_len.saturating_sub(1));
    }

    /// Switches active pane.
    pub const fn switch_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::Results => ActivePane::Watched,
            ActivePane::Watched => ActivePane::Results,
        };
    }

    /// Expands or collapses the active pane's box.
    pub const fn toggle_box(&mut self) {
        match self.active_pane {
            ActivePane::Results => self.results_open = !self.results_open,
            ActivePane::Watched => self.watched_open = !self.watched_open,
        }
    }

    /// Picks a star count. Values outside 1 to 5 are ignored.
    pub fn pick_stars(&mut self, stars: u8) {
        if (1..=5).contains(&stars) {
            self.stars = stars;
        }
    }

    /// Clears the star picker.
    pub const fn reset_stars(&mut self) {
        self.stars = 0;
    }

    /// Replaces the status message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

/// Renders a five-star gauge with `stars` filled.
#[must_use]
pub fn star_gauge(stars: u8) -> String {
    (1..=5u8)
        .map(|i| if i <= stars { '\u{2605}' } else { '\u{2606}' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        // Arrange & Act
        let state = ViewState::new();

        // Assert
        assert_eq!(state.active_pane, ActivePane::Results);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.stars, 0);
        assert!(state.results_open);
        assert!(state.watched_open);
    }

    #[test]
    fn test_move_down_and_up() {
        // Arrange
        let mut state = ViewState::new();

        // Act
        state.move_down(3);
        state.move_down(3);
        state.move_down(3);

        // Assert
        assert_eq!(state.results_cursor, 2);

        // Act
        state.move_up();
        state.move_up();
        state.move_up();

        // Assert
        assert_eq!(state.results_cursor, 0);
    }

    #[test]
    fn test_move_down_on_empty_list() {
        // Arrange
        let mut state = ViewState::new();

        // Act
        state.move_down(0);

        // Assert
        assert_eq!(state.results_cursor, 0);
    }

    #[test]
    fn test_cursors_are_per_pane() {
        // Arrange
        let mut state = ViewState::new();
        state.move_down(5);

        // Act
        state.switch_pane();
        state.move_down(5);
        state.move_down(5);

        // Assert
        assert_eq!(state.active_pane, ActivePane::Watched);
        assert_eq!(state.results_cursor, 1);
        assert_eq!(state.watched_cursor, 2);
    }

    #[test]
    fn test_clamp_after_list_shrinks() {
        // Arrange
        let mut state = ViewState {
            results_cursor: 4,
            watched_cursor: 2,
            ..ViewState::default()
        };

        // Act
        state.clamp(2, 0);

        // Assert
        assert_eq!(state.results_cursor, 1);
        assert_eq!(state.watched_cursor, 0);
    }

    #[test]
    fn test_toggle_box_follows_active_pane() {
        // Arrange
        let mut state = ViewState::new();

        // Act
        state.toggle_box();
        state.switch_pane();
        state.toggle_box();
        state.toggle_box();

        // Assert
        assert!(!state.results_open);
        assert!(state.watched_open);
    }

    #[test]
    fn test_pick_stars_ignores_out_of_range() {
        // Arrange
        let mut state = ViewState::new();

        // Act
        state.pick_stars(4);
        state.pick_stars(0);
        state.pick_stars(6);

        // Assert
        assert_eq!(state.stars, 4);

        // Act
        state.reset_stars();

        // Assert
        assert_eq!(state.stars, 0);
    }

    #[test]
    fn test_star_gauge() {
        // Arrange & Act & Assert
        assert_eq!(star_gauge(0), "\u{2606}\u{2606}\u{2606}\u{2606}\u{2606}");
        assert_eq!(star_gauge(3), "\u{2605}\u{2605}\u{2605}\u{2606}\u{2606}");
        assert_eq!(star_gauge(5), "\u{2605}\u{2605}\u{2605}\u{2605}\u{2605}");
    }
}
