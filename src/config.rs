use crate::keymap::Keymap;
use crate::store::firestore::CollectionPath;
use crate::styles::ThemeType;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: ThemeType,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub keymap: Keymap,
}

/// Firebase project settings. The URLs can point at the local emulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project
    pub api_key: String,
    pub project_id: String,
    pub database: String,
    /// Collection holding one document per student
    pub collection: String,
    pub auth_url: String,
    pub token_url: String,
    pub firestore_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            database: "(default)".to_string(),
            collection: "students".to_string(),
            auth_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            token_url: "https://securetoken.googleapis.com/v1".to_string(),
            firestore_url: "https://firestore.googleapis.com/v1".to_string(),
        }
    }
}

impl FirebaseConfig {
    /// Whether enough is configured to talk to Firebase.
    pub fn is_ready(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    pub fn collection_path(&self) -> CollectionPath {
        CollectionPath {
            base_url: self.firestore_url.clone(),
            project_id: self.project_id.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Re-fetch the whole list after a successful add or edit
    pub resync_after_write: bool,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            resync_after_write: true,
        }
    }
}

impl Config {
    /// Load the config, writing a default one first if none exists.
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    /// Save with owner-only permissions (the file holds the API key).
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        crate::utils::restrict_permissions(config_path)?;
        Ok(())
    }

    /// Fail with a pointer to the config file when Firebase is not set up.
    pub fn require_firebase(&self, config_path: &Path) -> Result<&FirebaseConfig> {
        if !self.firebase.is_ready() {
            bail!(
                "Firebase is not configured. Set firebase.api_key and firebase.project_id in {:?}, \
                 or run with --offline.",
                config_path
            );
        }
        Ok(&self.firebase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::KeymapPreset;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_writes_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rollbook").join("config.toml");

        let config = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config_path.exists());
        assert!(config.records.resync_after_write);
        assert_eq!(config.firebase.collection, "students");
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "theme = \"light\"\n[firebase]\napi_key = \"k\"\nproject_id = \"p\"\n[keymap]\npreset = \"vim\"\n",
        )
        .unwrap();

        let config = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config.theme, ThemeType::Light);
        assert_eq!(config.keymap.preset, KeymapPreset::Vim);
        assert!(config.firebase.is_ready());
        assert_eq!(config.firebase.database, "(default)");
        assert!(config.records.resync_after_write);
    }

    #[test]
    fn test_require_firebase_names_config_path() {
        let config = Config::default();
        let err = config
            .require_firebase(Path::new("/tmp/rollbook/config.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/tmp/rollbook/config.toml"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "theme = [").unwrap();
        assert!(Config::load_or_create(&config_path).is_err());
    }
}
