//! rollbook - student records over Firebase, in the terminal
//!
//! Sign in with Firebase Auth, then list, add, view, edit and delete
//! student records stored in Cloud Firestore. The records controller in
//! [`state::records`] holds all of the screen's logic and can be driven
//! without a terminal.

pub mod app;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod components;
pub mod config;
pub mod keymap;
pub mod record;
pub mod screens;
pub mod state;
pub mod store;
pub mod styles;
pub mod tui;
pub mod utils;
pub mod widgets;

pub use config::Config;
pub use record::{Field, Record, RecordFields, RecordId};

// Keymap re-exports (used by Config and for external API)
pub use keymap::{Action, KeyBinding, Keymap, KeymapPreset};
