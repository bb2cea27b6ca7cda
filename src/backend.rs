//! Wiring of the auth provider and record store for a run.

use crate::auth::{Authenticator, FirebaseAuth, LocalAuth, SessionHandle, SessionVault};
use crate::config::Config;
use crate::store::{FirestoreStore, MemoryStore, RecordStore};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The collaborators every screen and command works through.
#[derive(Clone)]
pub struct Backend {
    pub auth: Authenticator,
    pub store: Arc<dyn RecordStore>,
    pub offline: bool,
}

impl Backend {
    /// Firebase Auth and Firestore, with the session persisted to `session_path`.
    pub fn online(config: &Config, config_path: &Path, session_path: &Path) -> Result<Self> {
        let firebase = config.require_firebase(config_path)?;
        let provider = FirebaseAuth::new(
            firebase.api_key.clone(),
            firebase.auth_url.clone(),
            firebase.token_url.clone(),
        );
        let auth = Authenticator::new(Arc::new(provider), SessionHandle::new())
            .with_vault(SessionVault::new(session_path));
        let store = FirestoreStore::new(auth.clone(), firebase.collection_path());
        info!(
            project = %firebase.project_id,
            collection = %firebase.collection,
            "Using Firestore backend"
        );
        Ok(Self {
            auth,
            store: Arc::new(store),
            offline: false,
        })
    }

    /// Local accounts and an in-memory store. Nothing touches the disk.
    pub fn offline() -> Self {
        info!("Using offline backend");
        Self {
            auth: Authenticator::new(Arc::new(LocalAuth::new()), SessionHandle::new()),
            store: Arc::new(MemoryStore::new()),
            offline: true,
        }
    }

    pub fn connect(
        config: &Config,
        config_path: &Path,
        session_path: &Path,
        offline: bool,
    ) -> Result<Self> {
        if offline {
            Ok(Self::offline())
        } else {
            Self::online(config, config_path, session_path)
        }
    }

    pub fn session(&self) -> &SessionHandle {
        self.auth.session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_online_requires_firebase_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let session_path = temp_dir.path().join("session.json");

        let err = Backend::connect(&Config::default(), &config_path, &session_path, false)
            .err()
            .unwrap();
        assert!(err.to_string().contains("--offline"));
    }

    #[test]
    fn test_offline_needs_no_config() {
        let temp_dir = TempDir::new().unwrap();
        let backend = Backend::connect(
            &Config::default(),
            &temp_dir.path().join("config.toml"),
            &temp_dir.path().join("session.json"),
            true,
        )
        .unwrap();
        assert!(backend.offline);
        assert!(!backend.session().is_signed_in());
    }

    #[test]
    fn test_online_with_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.firebase.api_key = "key".to_string();
        config.firebase.project_id = "school".to_string();

        let backend = Backend::connect(
            &config,
            &temp_dir.path().join("config.toml"),
            &temp_dir.path().join("session.json"),
            false,
        )
        .unwrap();
        assert!(!backend.offline);
    }
}
