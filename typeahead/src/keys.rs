//! Key codes understood by the control.

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Character key
    Char(char),
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Home
    Home,
    /// End
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Tab
    Tab,
}

impl Key {
    /// Navigation keys move the caret or the highlight and never dispatch a query.
    pub fn is_navigation(&self) -> bool {
        !matches!(self, Key::Char(_) | Key::Backspace | Key::Delete)
    }
}
