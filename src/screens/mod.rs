//! Screen controllers.
//!
//! The app shows exactly one screen at a time, chosen by the session:
//!
//! ```text
//!   no session ──▶ LoginScreen ──(sign in)──▶ RecordsScreen
//!        ▲                                          │
//!        └──────────── logout / token rejected ─────┘
//! ```
//!
//! Each screen owns its state, renders itself and answers key events with a
//! [`ScreenAction`].

pub mod login;
pub mod records;
pub mod screen_trait;

pub use login::LoginScreen;
pub use records::RecordsScreen;
pub use screen_trait::{typing_action, Screen, ScreenAction, ScreenContext};
