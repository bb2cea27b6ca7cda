pub mod layout;
pub mod path;
pub mod table_navigation;
pub mod task;
pub mod text_input;

pub use layout::{center_popup, centered_width};
pub use path::{config_dir, config_path, log_dir, session_path};
pub use table_navigation::TableStateExt;
pub use task::{TaskHandle, TaskPoll};
pub use text_input::TextInput;

use anyhow::{Context, Result};
use std::path::Path;

/// Restrict a file to its owner (0600). No-op on non-unix platforms.
pub fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)
            .with_context(|| format!("Failed to get file metadata: {:?}", path))?
            .permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set file permissions: {:?}", path))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
