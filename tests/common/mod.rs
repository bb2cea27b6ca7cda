//! Shared test utilities for the records workflow tests.
//!
//! Provides `TestEnv`: a tokio runtime, a seeded in-memory store wrapped in
//! a `FlakyStore` that can be told to fail, and a `RecordsState` wired to it.

#![allow(dead_code)]

use async_trait::async_trait;
use rollbook::record::{Field, Record, RecordFields, RecordId};
use rollbook::state::RecordsState;
use rollbook::store::{MemoryStore, RecordStore, StoreError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

/// The four store calls, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Remove,
}

/// A `MemoryStore` whose calls can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<StoreOp>>,
    calls: AtomicUsize,
}

impl FlakyStore {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
            ..Self::default()
        }
    }

    /// Make every `op` call fail until `recover` is called.
    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Records as the store holds them.
    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.snapshot()
    }

    pub fn ids(&self) -> Vec<String> {
        ids_of(&self.snapshot())
    }

    /// Store calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&op) {
            Err(StoreError::new(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.check(StoreOp::List)?;
        self.inner.list_all().await
    }

    async fn create(&self, fields: RecordFields) -> Result<Record, StoreError> {
        self.check(StoreOp::Create)?;
        self.inner.create(fields).await
    }

    async fn update(&self, id: &RecordId, fields: RecordFields) -> Result<(), StoreError> {
        self.check(StoreOp::Update)?;
        self.inner.update(id, fields).await
    }

    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        self.check(StoreOp::Remove)?;
        self.inner.remove(id).await
    }
}

/// Every field filled with `<prefix> <label>`; the name is `prefix`.
pub fn complete_fields(prefix: &str) -> RecordFields {
    Field::ALL
        .iter()
        .fold(RecordFields::empty(), |fields, field| {
            fields.with(*field, format!("{prefix} {}", field.label()))
        })
        .with(Field::Name, prefix)
}

pub fn student(id: &str, name: &str) -> Record {
    Record::new(id, complete_fields(name))
}

pub fn ids_of(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.id.as_str().to_string()).collect()
}

/// Builder for an isolated records environment.
pub struct TestEnvBuilder {
    records: Vec<Record>,
    resync_after_write: bool,
}

impl TestEnvBuilder {
    /// Seed the store with a student.
    pub fn with_student(mut self, id: &str, name: &str) -> Self {
        self.records.push(student(id, name));
        self
    }

    pub fn with_resync(mut self, resync_after_write: bool) -> Self {
        self.resync_after_write = resync_after_write;
        self
    }

    pub fn build(self) -> TestEnv {
        let runtime = Runtime::new().expect("tokio runtime");
        let store = Arc::new(FlakyStore::with_records(self.records));
        let state = RecordsState::new(store.clone(), runtime.handle().clone())
            .with_resync(self.resync_after_write);
        TestEnv {
            state,
            store,
            _runtime: runtime,
        }
    }
}

pub struct TestEnv {
    pub state: RecordsState,
    pub store: Arc<FlakyStore>,
    _runtime: Runtime,
}

impl TestEnv {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> TestEnvBuilder {
        TestEnvBuilder {
            records: Vec::new(),
            resync_after_write: true,
        }
    }

    /// Seeded and loaded: `r1` Ann, `r2` Ben, `r3` Cy.
    pub fn loaded() -> TestEnv {
        let mut env = TestEnv::new()
            .with_student("r1", "Ann")
            .with_student("r2", "Ben")
            .with_student("r3", "Cy")
            .build();
        env.state.load();
        env.state.settle();
        env
    }

    pub fn local_ids(&self) -> Vec<String> {
        ids_of(self.state.records())
    }

    pub fn record(&self, id: &str) -> Record {
        self.state
            .records()
            .iter()
            .find(|r| r.id.as_str() == id)
            .cloned()
            .unwrap_or_else(|| panic!("no local record {id}"))
    }

    /// Fill the form buffer field by field, as the UI does.
    pub fn fill_form(&mut self, fields: &RecordFields) {
        for (field, value) in fields.iter() {
            self.state.update_field(field, value);
        }
    }
}
