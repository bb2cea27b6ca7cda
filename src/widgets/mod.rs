// Reusable UI widgets

pub mod dialog;
pub mod text_input;
pub mod toast;

pub use dialog::{Dialog, DialogVariant};
pub use text_input::{TextInputWidget, TextInputWidgetExt};
pub use toast::{Toast, ToastManager, ToastVariant};
