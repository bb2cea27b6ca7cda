//! Key strings such as `"ctrl+s"`, `"shift+tab"` or `"?"`, and their
//! matching against terminal key events.

use super::Action;
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maps one key combination to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: Action,
    /// Shown in the help overlay instead of the action's own description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A parsed, normalized key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    /// Normalize a terminal key event.
    ///
    /// Terminals disagree on how shifted characters arrive (`'L'` alone,
    /// `'L'` + SHIFT, `'?'` + SHIFT). Letters become lowercase + SHIFT;
    /// other characters drop SHIFT since it is part of the symbol.
    pub fn from_event(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => Self {
                code: KeyCode::Char(c.to_ascii_lowercase()),
                modifiers: modifiers | KeyModifiers::SHIFT,
            },
            KeyCode::Char(c) if c.is_ascii_lowercase() => Self { code, modifiers },
            KeyCode::Char(_) => Self {
                code,
                modifiers: modifiers - KeyModifiers::SHIFT,
            },
            KeyCode::BackTab => Self {
                code: KeyCode::Tab,
                modifiers: modifiers | KeyModifiers::SHIFT,
            },
            _ => Self { code, modifiers },
        }
    }
}

impl FromStr for KeyChord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // A lone "+" is the key itself, not a separator.
        let (modifier_part, key_part) = match s.rsplit_once('+') {
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in modifier_part.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.trim().to_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "super" | "cmd" | "meta" => KeyModifiers::SUPER,
                other => return Err(format!("Unknown modifier: {other}")),
            };
        }

        let code = parse_key_name(key_part)?;
        Ok(Self::from_event(code, modifiers))
    }
}

fn parse_key_name(name: &str) -> Result<KeyCode, String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let code = match name.to_lowercase().as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
            _ => return Err(format!("Unknown key: {name}")),
        },
    };
    Ok(code)
}

impl KeyBinding {
    pub fn new(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
            description: None,
        }
    }

    pub fn chord(&self) -> Result<KeyChord, String> {
        self.key.parse()
    }

    /// Whether a (normalized) key event triggers this binding.
    pub fn matches(&self, event: KeyChord) -> bool {
        self.chord().is_ok_and(|chord| chord == event)
    }

    /// Human form of the key, e.g. `Ctrl+S`.
    pub fn display(&self) -> String {
        let Ok(chord) = self.chord() else {
            return self.key.clone();
        };
        let mut parts: Vec<String> = Vec::new();
        if chord.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".into());
        }
        if chord.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".into());
        }
        if chord.modifiers.contains(KeyModifiers::SUPER) {
            parts.push("Cmd".into());
        }
        if chord.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".into());
        }
        parts.push(match chord.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Delete => "Del".into(),
            other => format!("{other:?}"),
        });
        parts.join("+")
    }

    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or_else(|| self.action.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> KeyChord {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_plain_and_modified_keys() {
        assert_eq!(chord("c").code, KeyCode::Char('c'));
        assert_eq!(chord("ctrl+s").modifiers, KeyModifiers::CONTROL);
        assert_eq!(chord("enter").code, KeyCode::Enter);
        assert_eq!(chord("f5").code, KeyCode::F(5));
        assert_eq!(chord("ctrl++").code, KeyCode::Char('+'));
        assert!("hyper+x".parse::<KeyChord>().is_err());
        assert!("nonsense".parse::<KeyChord>().is_err());
    }

    #[test]
    fn test_shifted_letters_normalize() {
        let expected = chord("shift+l");
        assert_eq!(chord("L"), expected);
        assert_eq!(
            KeyChord::from_event(KeyCode::Char('L'), KeyModifiers::SHIFT),
            expected
        );
        assert_eq!(
            KeyChord::from_event(KeyCode::Char('L'), KeyModifiers::NONE),
            expected
        );
    }

    #[test]
    fn test_shifted_symbols_drop_shift() {
        let help = KeyBinding::new("?", Action::Help);
        assert!(help.matches(KeyChord::from_event(KeyCode::Char('?'), KeyModifiers::SHIFT)));
        assert!(help.matches(KeyChord::from_event(KeyCode::Char('?'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_backtab_is_shift_tab() {
        let prev = KeyBinding::new("shift+tab", Action::PrevField);
        assert!(prev.matches(KeyChord::from_event(KeyCode::BackTab, KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyBinding::new("ctrl+s", Action::Save).display(), "Ctrl+S");
        assert_eq!(KeyBinding::new("shift+l", Action::Logout).display(), "Shift+L");
        assert_eq!(KeyBinding::new("up", Action::MoveUp).display(), "↑");
        assert_eq!(KeyBinding::new("enter", Action::Confirm).display(), "Enter");
    }
}
