//! Configurable key bindings.
//!
//! A [`Keymap`] is a preset plus user overrides from `config.toml`:
//!
//! ```toml
//! [keymap]
//! preset = "vim"
//! overrides = [{ key = "a", action = "create" }]
//! ```
//!
//! Overriding an action replaces every preset binding for that action.

mod actions;
mod binding;
mod presets;

pub use actions::Action;
pub use binding::{KeyBinding, KeyChord};
pub use presets::KeymapPreset;

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    #[serde(default)]
    pub preset: KeymapPreset,

    #[serde(default)]
    pub overrides: Vec<KeyBinding>,
}

impl Keymap {
    /// Resolve a key event to an action; overrides win over the preset.
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        let chord = KeyChord::from_event(code, modifiers);
        self.all_bindings()
            .into_iter()
            .find(|binding| binding.matches(chord))
            .map(|binding| binding.action)
    }

    /// Effective bindings: overrides first, then preset bindings for
    /// actions that are not overridden.
    pub fn all_bindings(&self) -> Vec<KeyBinding> {
        let mut bindings = self.overrides.clone();
        bindings.extend(
            self.preset
                .bindings()
                .into_iter()
                .filter(|preset| !self.overrides.iter().any(|o| o.action == preset.action)),
        );
        bindings
    }

    /// Display form of the first key bound to `action`.
    pub fn key_for(&self, action: Action) -> String {
        self.all_bindings()
            .iter()
            .find(|b| b.action == action)
            .map_or_else(|| "unbound".to_string(), KeyBinding::display)
    }

    /// Footer hint: `"C: Add student | ..."` for the given actions.
    pub fn hints(&self, actions: &[(Action, &str)]) -> String {
        actions
            .iter()
            .map(|(action, label)| format!("{}: {}", self.key_for(*action), label))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Override keys that do not parse, for reporting at startup.
    pub fn invalid_overrides(&self) -> Vec<String> {
        self.overrides
            .iter()
            .filter_map(|b| b.chord().err().map(|e| format!("{}: {}", b.key, e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_records_keys() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.get_action(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(Action::Create)
        );
        assert_eq!(
            keymap.get_action(KeyCode::Char('L'), KeyModifiers::SHIFT),
            Some(Action::Logout)
        );
        assert_eq!(
            keymap.get_action(KeyCode::Char('l'), KeyModifiers::NONE),
            None
        );
    }

    #[test]
    fn test_override_shadows_preset_action() {
        let keymap = Keymap {
            preset: KeymapPreset::Standard,
            overrides: vec![KeyBinding::new("a", Action::Create)],
        };
        assert_eq!(
            keymap.get_action(KeyCode::Char('a'), KeyModifiers::NONE),
            Some(Action::Create)
        );
        assert_eq!(
            keymap.get_action(KeyCode::Char('c'), KeyModifiers::NONE),
            None
        );
        assert_eq!(keymap.key_for(Action::Create), "A");
    }

    #[test]
    fn test_hints() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.hints(&[(Action::Create, "Add"), (Action::Quit, "Quit")]),
            "C: Add | Q: Quit"
        );
    }

    #[test]
    fn test_invalid_overrides_reported() {
        let keymap = Keymap {
            preset: KeymapPreset::Vim,
            overrides: vec![KeyBinding::new("hyper+x", Action::Quit)],
        };
        assert_eq!(keymap.invalid_overrides().len(), 1);
    }
}
