use super::{RecordStore, StoreError};
use crate::record::{Record, RecordFields, RecordId};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

/// In-process record store.
///
/// Keeps records in insertion order and hands out sequential ids
/// (`local-1`, `local-2`, ...). Removing an unknown id succeeds, matching
/// Firestore's delete semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Record>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records (ids are kept as given).
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records,
                next_id: 0,
            }),
        }
    }

    /// Snapshot of the stored records.
    pub fn snapshot(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Every mutation is a single Vec operation, so poisoning never
        // leaves `records` half-written.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.snapshot())
    }

    async fn create(&self, fields: RecordFields) -> Result<Record, StoreError> {
        let mut inner = self.lock();
        let id = loop {
            inner.next_id += 1;
            let candidate = RecordId::new(format!("local-{}", inner.next_id));
            if !inner.records.iter().any(|r| r.id == candidate) {
                break candidate;
            }
        };
        let record = Record::new(id, fields);
        debug!("memory store: created {}", record.id);
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, fields: RecordFields) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::new(format!("no student with id {id}")))?;
        record.fields = fields;
        Ok(())
    }

    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        self.lock().records.retain(|r| &r.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let store = MemoryStore::with_records(vec![Record::new("local-1", RecordFields::empty())]);
        let created = block_on(store.create(RecordFields::empty().with(Field::Name, "Ann"))).unwrap();
        assert_eq!(created.id.as_str(), "local-2");
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let store = MemoryStore::new();
        let err = block_on(store.update(&RecordId::new("nope"), RecordFields::empty())).unwrap_err();
        assert!(err.message().contains("nope"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = MemoryStore::with_records(vec![Record::new("r1", RecordFields::empty())]);
        block_on(store.remove(&RecordId::new("r1"))).unwrap();
        block_on(store.remove(&RecordId::new("r1"))).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
