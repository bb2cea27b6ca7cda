//! The `Screen` trait implemented by the login and records screens.
//!
//! Screens own their state, draw themselves, and answer events with a
//! [`ScreenAction`] for the app to carry out. They never touch the terminal
//! or the session directly.

use crate::config::Config;
use crate::keymap::{Action, Keymap};
use crate::widgets::Toast;
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::path::Path;

/// Read-only app context handed to screens.
pub struct ScreenContext<'a> {
    pub config: &'a Config,
    pub config_path: &'a Path,
    /// Email of the signed-in user, if any.
    pub user: Option<&'a str>,
    pub offline: bool,
}

impl<'a> ScreenContext<'a> {
    pub fn new(config: &'a Config, config_path: &'a Path) -> Self {
        Self {
            config,
            config_path,
            user: None,
            offline: false,
        }
    }

    /// Header status text: who is signed in, and against what.
    pub fn status(&self) -> String {
        match (self.user, self.offline) {
            (Some(user), true) => format!("{user} (offline)"),
            (Some(user), false) => user.to_string(),
            (None, true) => "offline".to_string(),
            (None, false) => "not signed in".to_string(),
        }
    }
}

/// What a screen asks the app to do after an event or tick.
#[derive(Debug, Clone, Default)]
pub enum ScreenAction {
    #[default]
    None,
    Quit,
    ShowHelp,
    /// Sign out and return to the login screen.
    Logout,
    Notify(Toast),
}

/// Resolve a key while a text input has focus. Plain keys only map to
/// editing actions; control chords always resolve.
pub fn typing_action(keymap: &Keymap, key: &KeyEvent) -> Option<Action> {
    let action = keymap.get_action(key.code, key.modifiers)?;
    if action.applies_while_typing() || key.modifiers.contains(KeyModifiers::CONTROL) {
        Some(action)
    } else {
        None
    }
}

pub trait Screen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) -> Result<()>;

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction>;

    /// Called once per UI tick to pick up background results.
    fn tick(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }

    /// While true, printable keys are text rather than shortcuts.
    fn is_input_focused(&self) -> bool {
        false
    }

    /// Called when the screen becomes the active one.
    fn on_enter(&mut self, _ctx: &ScreenContext) -> Result<()> {
        Ok(())
    }
}
