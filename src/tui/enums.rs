//! Enumerations for TUI state management.

/// Which screen or overlay currently receives input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    CategoryPicker,
    Help,
    Confirm,
}

impl AppState {
    /// Overlays are drawn on top of a dimmed task list.
    pub fn is_overlay(self) -> bool {
        !matches!(self, AppState::TaskList | AppState::Help)
    }
}
