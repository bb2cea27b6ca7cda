//! Record storage backends.
//!
//! The records screen talks to storage only through [`RecordStore`]. Two
//! implementations ship with the crate:
//!
//! - [`FirestoreStore`]: Cloud Firestore over its REST API (the default).
//! - [`MemoryStore`]: an in-process store used by offline mode and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::record::{Record, RecordFields, RecordId};
use async_trait::async_trait;

/// Any failure of a store call.
///
/// Not-found, permission and network failures are not
/// distinguished; the caller retries the action either way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self(format!("request failed: {err}"))
    }
}

impl From<crate::auth::AuthError> for StoreError {
    fn from(err: crate::auth::AuthError) -> Self {
        Self(format!("authentication failed: {err}"))
    }
}

/// CRUD access to student records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record in store order.
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;

    /// Create a record; the store assigns its id.
    async fn create(&self, fields: RecordFields) -> Result<Record, StoreError>;

    /// Replace every editable field of an existing record.
    async fn update(&self, id: &RecordId, fields: RecordFields) -> Result<(), StoreError>;

    /// Delete a record.
    async fn remove(&self, id: &RecordId) -> Result<(), StoreError>;
}
