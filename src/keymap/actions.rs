use serde::{Deserialize, Serialize};

/// Something a key press can ask the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Table navigation
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToEnd,

    // Cursor movement inside an input
    MoveLeft,
    MoveRight,
    Home,
    End,
    Backspace,
    DeleteChar,

    // Form focus
    NextField,
    PrevField,

    Confirm,
    Cancel,
    Yes,
    No,

    // Records
    Create,
    View,
    Edit,
    Delete,
    Refresh,
    Save,

    // Login
    TogglePassword,
    SwitchMode,

    Logout,
    Help,
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Previous student",
            Action::MoveDown => "Next student",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::GoToTop => "First student",
            Action::GoToEnd => "Last student",
            Action::MoveLeft => "Cursor left",
            Action::MoveRight => "Cursor right",
            Action::Home => "Cursor to start",
            Action::End => "Cursor to end",
            Action::Backspace => "Delete previous character",
            Action::DeleteChar => "Delete character",
            Action::NextField => "Next field",
            Action::PrevField => "Previous field",
            Action::Confirm => "Confirm",
            Action::Cancel => "Cancel / close",
            Action::Yes => "Yes",
            Action::No => "No",
            Action::Create => "Add student",
            Action::View => "View student",
            Action::Edit => "Edit student",
            Action::Delete => "Delete student",
            Action::Refresh => "Reload from server",
            Action::Save => "Save form",
            Action::TogglePassword => "Show / hide password",
            Action::SwitchMode => "Switch sign in / sign up",
            Action::Logout => "Log out",
            Action::Help => "Show help",
            Action::Quit => "Quit",
        }
    }

    /// Heading used to group bindings in the help overlay.
    pub fn category(&self) -> &'static str {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::PageUp
            | Action::PageDown
            | Action::GoToTop
            | Action::GoToEnd => "Navigation",

            Action::MoveLeft
            | Action::MoveRight
            | Action::Home
            | Action::End
            | Action::Backspace
            | Action::DeleteChar
            | Action::NextField
            | Action::PrevField
            | Action::Save => "Forms",

            Action::Confirm | Action::Cancel | Action::Yes | Action::No => "Dialogs",

            Action::Create
            | Action::View
            | Action::Edit
            | Action::Delete
            | Action::Refresh => "Students",

            Action::TogglePassword | Action::SwitchMode | Action::Logout => "Account",

            Action::Help | Action::Quit => "Global",
        }
    }

    /// Whether the action still applies while a text input has focus.
    ///
    /// Everything else is bound to a printable key that must reach the
    /// input as text.
    pub fn applies_while_typing(&self) -> bool {
        matches!(
            self,
            Action::Cancel
                | Action::Confirm
                | Action::NextField
                | Action::PrevField
                | Action::MoveLeft
                | Action::MoveRight
                | Action::Home
                | Action::End
                | Action::Backspace
                | Action::DeleteChar
                | Action::Save
                | Action::TogglePassword
                | Action::SwitchMode
        )
    }
}
