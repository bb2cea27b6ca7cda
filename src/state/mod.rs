//! Screen state, kept apart from rendering.
//!
//! Each screen owns exactly one of these. They hold no terminal types, so
//! the whole add/view/edit/delete flow can be driven from tests.

pub mod login;
pub mod records;

pub use login::{AuthMode, LoginField, LoginOutcome, LoginState, LOGIN_FAILED};
pub use records::{Completion, Dispatch, Modal, Operation, RecordsState};
