use super::{Action, KeyBinding};
use serde::{Deserialize, Serialize};

/// Built-in key binding sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeymapPreset {
    /// Arrow keys, Enter and Esc.
    #[default]
    Standard,
    /// Standard plus hjkl-style navigation.
    Vim,
}

impl KeymapPreset {
    pub fn bindings(&self) -> Vec<KeyBinding> {
        match self {
            KeymapPreset::Standard => standard_bindings(),
            KeymapPreset::Vim => vim_bindings(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeymapPreset::Standard => "Standard",
            KeymapPreset::Vim => "Vim",
        }
    }
}

/// Bindings shared by every preset: dialogs, forms and the login screen.
fn common_bindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("enter", Action::Confirm),
        KeyBinding::new("esc", Action::Cancel),
        KeyBinding::new("y", Action::Yes),
        KeyBinding::new("n", Action::No),
        KeyBinding::new("tab", Action::NextField),
        KeyBinding::new("shift+tab", Action::PrevField),
        KeyBinding::new("left", Action::MoveLeft),
        KeyBinding::new("right", Action::MoveRight),
        KeyBinding::new("home", Action::Home),
        KeyBinding::new("end", Action::End),
        KeyBinding::new("backspace", Action::Backspace),
        KeyBinding::new("delete", Action::DeleteChar),
        KeyBinding::new("ctrl+s", Action::Save),
        KeyBinding::new("ctrl+p", Action::TogglePassword),
        KeyBinding::new("ctrl+n", Action::SwitchMode),
        KeyBinding::new("?", Action::Help),
        KeyBinding::new("q", Action::Quit),
        KeyBinding::new("ctrl+c", Action::Quit),
    ]
}

fn standard_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::new("up", Action::MoveUp),
        KeyBinding::new("down", Action::MoveDown),
        KeyBinding::new("pageup", Action::PageUp),
        KeyBinding::new("pagedown", Action::PageDown),
        KeyBinding::new("ctrl+home", Action::GoToTop),
        KeyBinding::new("ctrl+end", Action::GoToEnd),
        KeyBinding::new("c", Action::Create),
        KeyBinding::new("v", Action::View),
        KeyBinding::new("e", Action::Edit),
        KeyBinding::new("d", Action::Delete),
        KeyBinding::new("r", Action::Refresh),
        KeyBinding::new("shift+l", Action::Logout),
    ];
    bindings.extend(common_bindings());
    bindings
}

fn vim_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::new("k", Action::MoveUp),
        KeyBinding::new("up", Action::MoveUp),
        KeyBinding::new("j", Action::MoveDown),
        KeyBinding::new("down", Action::MoveDown),
        KeyBinding::new("ctrl+u", Action::PageUp),
        KeyBinding::new("pageup", Action::PageUp),
        KeyBinding::new("ctrl+d", Action::PageDown),
        KeyBinding::new("pagedown", Action::PageDown),
        KeyBinding::new("g", Action::GoToTop),
        KeyBinding::new("shift+g", Action::GoToEnd),
        KeyBinding::new("o", Action::Create),
        KeyBinding::new("c", Action::Create),
        KeyBinding::new("v", Action::View),
        KeyBinding::new("e", Action::Edit),
        KeyBinding::new("d", Action::Delete),
        KeyBinding::new("r", Action::Refresh),
        KeyBinding::new("shift+l", Action::Logout),
    ];
    bindings.extend(common_bindings());
    bindings
}
