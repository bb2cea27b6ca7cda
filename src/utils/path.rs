use std::path::PathBuf;

/// Environment variable that relocates the config directory.
pub const CONFIG_DIR_ENV: &str = "ROLLBOOK_CONFIG_DIR";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// `~/.config/rollbook` on every OS, unless `ROLLBOOK_CONFIG_DIR` is set.
pub fn config_dir() -> PathBuf {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(".config").join("rollbook"),
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the signed-in session is persisted between runs.
pub fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

/// Log directory: the platform cache dir, falling back to the home dir.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(home_dir).join("rollbook")
}
