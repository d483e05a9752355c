use crate::config::DebuggerConfig;

/// Mutable record owned by the session driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub non_interactive: bool,
    /// Source lines shown around the stop location (0 = off).
    pub display_lines: u32,
    pub scroll_offset: i64,
    pub quit_requested: bool,
    /// The engine reported the end of the session during a nested drain.
    pub remote_closed: bool,
    /// Quit came from end of operator input rather than an explicit `quit`.
    pub input_ended: bool,
}

impl SessionState {
    #[must_use]
    pub fn new(non_interactive: bool, display_lines: u32) -> Self {
        Self {
            non_interactive,
            display_lines,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &DebuggerConfig) -> Self {
        Self::new(config.non_interactive, config.display)
    }

    /// Whether the driver must stop before its next iteration.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.quit_requested || self.remote_closed
    }

    /// Lines moved per scroll key: a third of the display window, at least one.
    #[must_use]
    pub fn scroll_step(&self) -> i64 {
        i64::from((self.display_lines / 3).max(1))
    }

    pub fn scroll_up(&mut self) -> i64 {
        self.scroll_offset -= self.scroll_step();
        self.scroll_offset
    }

    pub fn scroll_down(&mut self) -> i64 {
        self.scroll_offset += self.scroll_step();
        self.scroll_offset
    }
}
