//! The records controller: the student list, the modal state machine and
//! the single in-flight store call.
//!
//! Every remote call runs on the tokio runtime and reports back through a
//! [`TaskHandle`]; the UI loop calls [`RecordsState::poll`] once per tick.
//! While a call is outstanding the state is *pending* and every action
//! returns [`Dispatch::Blocked`].
//!
//! ```text
//!            open_add / open_edit / open_view / request_delete
//!   None ───────────────────────────────────────────────────────▶ modal
//!    ▲                                                              │
//!    └──── cancel | successful submit | delete completion ──────────┘
//!          (Add/Edit stay open when the store call fails)
//! ```

use crate::record::{Field, Record, RecordFields, RecordId};
use crate::store::{RecordStore, StoreError};
use crate::utils::{TaskHandle, TaskPoll};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Which dialog is open over the student table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    Add,
    View,
    Edit,
    DeleteConfirm,
}

/// A remote call the controller can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Explicit (re)load; success clears the error banner.
    Load,
    /// Re-fetch after a successful add or edit.
    Resync,
    Create,
    Update,
    Remove,
    /// Re-fetch after a failed delete; the delete error stays visible.
    Reconcile,
}

impl Operation {
    /// Banner text when this operation fails. The cause goes to the log.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Load | Operation::Resync | Operation::Reconcile => {
                "Could not load students. Please try again."
            }
            Operation::Create => "Could not save the new student. Please try again.",
            Operation::Update => "Could not update the student. Please try again.",
            Operation::Remove => "Could not delete the student. Please try again.",
        }
    }

    pub fn in_progress_label(self) -> &'static str {
        match self {
            Operation::Load | Operation::Resync | Operation::Reconcile => "Loading students...",
            Operation::Create => "Saving student...",
            Operation::Update => "Updating student...",
            Operation::Remove => "Deleting student...",
        }
    }
}

/// Immediate result of a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A store call was started.
    Started,
    /// Local state changed; no remote call.
    Applied,
    /// A store call is already in flight.
    Blocked,
    /// Submit refused: these fields are empty.
    Incomplete(Vec<Field>),
    /// The action does not apply in the current modal.
    Ignored,
}

/// A finished store call, reported by [`RecordsState::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded { count: usize },
    Created { name: String },
    Updated { name: String },
    Deleted { name: String },
    Failed { operation: Operation, message: String },
}

/// What a spawned store call sends back.
#[derive(Debug)]
enum Outcome {
    Listed(Result<Vec<Record>, StoreError>),
    Created(Result<Record, StoreError>),
    Updated {
        id: RecordId,
        fields: RecordFields,
        result: Result<(), StoreError>,
    },
    Removed {
        id: RecordId,
        result: Result<(), StoreError>,
    },
}

struct InFlight {
    operation: Operation,
    handle: TaskHandle<Outcome>,
}

pub struct RecordsState {
    store: Arc<dyn RecordStore>,
    runtime: Handle,
    resync_after_write: bool,

    records: Vec<Record>,
    form: RecordFields,
    selected: Option<Record>,
    modal: Modal,
    missing: Vec<Field>,
    last_error: Option<String>,
    in_flight: Option<InFlight>,
}

impl RecordsState {
    pub fn new(store: Arc<dyn RecordStore>, runtime: Handle) -> Self {
        Self {
            store,
            runtime,
            resync_after_write: true,
            records: Vec::new(),
            form: RecordFields::empty(),
            selected: None,
            modal: Modal::None,
            missing: Vec::new(),
            last_error: None,
            in_flight: None,
        }
    }

    /// Whether a successful add/edit is followed by a full re-fetch.
    pub fn with_resync(mut self, resync_after_write: bool) -> Self {
        self.resync_after_write = resync_after_write;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn form(&self) -> &RecordFields {
        &self.form
    }

    pub fn selected(&self) -> Option<&Record> {
        self.selected.as_ref()
    }

    pub fn modal(&self) -> Modal {
        self.modal
    }

    /// Fields found empty on the last refused submit.
    pub fn missing(&self) -> &[Field] {
        &self.missing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_operation(&self) -> Option<Operation> {
        self.in_flight.as_ref().map(|f| f.operation)
    }

    // ---- actions -------------------------------------------------------

    /// Fetch every record from the store.
    pub fn load(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.spawn_list(Operation::Load);
        Dispatch::Started
    }

    pub fn open_add(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.form = RecordFields::empty();
        self.selected = None;
        self.missing.clear();
        self.modal = Modal::Add;
        Dispatch::Applied
    }

    pub fn open_view(&mut self, record: Record) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.selected = Some(record);
        self.modal = Modal::View;
        Dispatch::Applied
    }

    pub fn open_edit(&mut self, record: Record) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.form = record.fields.clone();
        self.selected = Some(record);
        self.missing.clear();
        self.modal = Modal::Edit;
        Dispatch::Applied
    }

    /// Write one field of the form buffer.
    pub fn update_field(&mut self, field: Field, value: impl Into<String>) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        if !matches!(self.modal, Modal::Add | Modal::Edit) {
            return Dispatch::Ignored;
        }
        self.form.set(field, value);
        if !self.form.get(field).trim().is_empty() {
            self.missing.retain(|f| *f != field);
        }
        Dispatch::Applied
    }

    pub fn submit_add(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        if self.modal != Modal::Add {
            return Dispatch::Ignored;
        }
        if let Some(refused) = self.refuse_incomplete() {
            return refused;
        }

        info!(event = "records.create.started", name = %self.form.get(Field::Name));
        let store = Arc::clone(&self.store);
        let fields = self.form.clone();
        self.spawn(Operation::Create, async move {
            Outcome::Created(store.create(fields).await)
        });
        Dispatch::Started
    }

    pub fn submit_edit(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        let Some(id) = self.selected.as_ref().map(|r| r.id.clone()) else {
            return Dispatch::Ignored;
        };
        if self.modal != Modal::Edit {
            return Dispatch::Ignored;
        }
        if let Some(refused) = self.refuse_incomplete() {
            return refused;
        }

        info!(event = "records.update.started", id = %id);
        let store = Arc::clone(&self.store);
        let fields = self.form.clone();
        self.spawn(Operation::Update, async move {
            let result = store.update(&id, fields.clone()).await;
            Outcome::Updated { id, fields, result }
        });
        Dispatch::Started
    }

    /// Ask for confirmation before deleting `record`. No remote call.
    pub fn request_delete(&mut self, record: Record) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.selected = Some(record);
        self.modal = Modal::DeleteConfirm;
        Dispatch::Applied
    }

    pub fn confirm_delete(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        if self.modal != Modal::DeleteConfirm {
            return Dispatch::Ignored;
        }
        let Some(id) = self.selected.as_ref().map(|r| r.id.clone()) else {
            return Dispatch::Ignored;
        };

        info!(event = "records.remove.started", id = %id);
        let store = Arc::clone(&self.store);
        self.spawn(Operation::Remove, async move {
            let result = store.remove(&id).await;
            Outcome::Removed { id, result }
        });
        Dispatch::Started
    }

    /// Close any modal, discarding the form buffer and the error banner.
    pub fn cancel(&mut self) -> Dispatch {
        if self.is_pending() {
            return Dispatch::Blocked;
        }
        self.close_modal();
        self.last_error = None;
        Dispatch::Applied
    }

    // ---- completion ----------------------------------------------------

    /// Apply the in-flight call's result if it has arrived. Never blocks.
    pub fn poll(&mut self) -> Option<Completion> {
        let in_flight = self.in_flight.as_mut()?;
        let operation = in_flight.operation;
        match in_flight.handle.try_take() {
            TaskPoll::Pending => None,
            TaskPoll::Ready(outcome) => {
                self.in_flight = None;
                self.finish(operation, outcome)
            }
            TaskPoll::Dropped => {
                self.in_flight = None;
                self.interrupted(operation)
            }
        }
    }

    /// Block until no call is in flight, applying every result (including
    /// follow-up re-fetches). For non-interactive callers and tests; must
    /// not be called from inside the runtime.
    pub fn settle(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Some(InFlight { operation, handle }) = self.in_flight.take() {
            let completion = match handle.wait() {
                TaskPoll::Ready(outcome) => self.finish(operation, outcome),
                TaskPoll::Pending | TaskPoll::Dropped => self.interrupted(operation),
            };
            completions.extend(completion);
        }
        completions
    }

    fn finish(&mut self, operation: Operation, outcome: Outcome) -> Option<Completion> {
        match outcome {
            Outcome::Listed(Ok(records)) => {
                self.records = dedupe(records);
                info!(
                    event = "records.list.completed",
                    count = self.records.len(),
                    ?operation
                );
                match operation {
                    Operation::Reconcile => None,
                    Operation::Resync => {
                        self.last_error = None;
                        None
                    }
                    _ => {
                        self.last_error = None;
                        Some(Completion::Loaded {
                            count: self.records.len(),
                        })
                    }
                }
            }
            Outcome::Listed(Err(e)) => {
                if operation == Operation::Reconcile {
                    warn!(event = "records.reconcile.failed", error = %e);
                    None
                } else {
                    Some(self.fail(operation, &e))
                }
            }

            Outcome::Created(Ok(record)) => {
                let name = record.get(Field::Name).to_string();
                match self.records.iter_mut().find(|r| r.id == record.id) {
                    Some(existing) => *existing = record,
                    None => self.records.push(record),
                }
                self.written();
                Some(Completion::Created { name })
            }
            Outcome::Created(Err(e)) => Some(self.fail(operation, &e)),

            Outcome::Updated {
                id,
                fields,
                result: Ok(()),
            } => {
                let name = fields.get(Field::Name).to_string();
                match self.records.iter_mut().find(|r| r.id == id) {
                    Some(existing) => existing.fields = fields,
                    None => debug!("updated student {} is not in the local list", id),
                }
                self.written();
                Some(Completion::Updated { name })
            }
            Outcome::Updated { result: Err(e), .. } => Some(self.fail(operation, &e)),

            Outcome::Removed { id, result: Ok(()) } => {
                let name = self
                    .records
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.get(Field::Name).to_string())
                    .unwrap_or_default();
                self.records.retain(|r| r.id != id);
                self.close_modal();
                self.last_error = None;
                info!(event = "records.remove.completed", id = %id);
                Some(Completion::Deleted { name })
            }
            Outcome::Removed { result: Err(e), .. } => {
                let completion = self.fail(operation, &e);
                self.close_modal();
                self.spawn_list(Operation::Reconcile);
                Some(completion)
            }
        }
    }

    /// The task vanished without reporting (panic inside the store).
    fn interrupted(&mut self, operation: Operation) -> Option<Completion> {
        let e = StoreError::new("background task ended unexpectedly");
        match operation {
            Operation::Reconcile => {
                warn!(event = "records.reconcile.failed", error = %e);
                None
            }
            Operation::Remove => {
                let completion = self.fail(operation, &e);
                self.close_modal();
                Some(completion)
            }
            _ => Some(self.fail(operation, &e)),
        }
    }

    fn fail(&mut self, operation: Operation, cause: &StoreError) -> Completion {
        error!(event = "records.operation.failed", ?operation, error = %cause);
        let message = operation.failure_message().to_string();
        self.last_error = Some(message.clone());
        Completion::Failed { operation, message }
    }

    /// Shared tail of a successful add or edit.
    fn written(&mut self) {
        self.close_modal();
        self.last_error = None;
        if self.resync_after_write {
            self.spawn_list(Operation::Resync);
        }
    }

    fn close_modal(&mut self) {
        self.modal = Modal::None;
        self.form = RecordFields::empty();
        self.selected = None;
        self.missing.clear();
    }

    fn refuse_incomplete(&mut self) -> Option<Dispatch> {
        let missing = self.form.missing();
        if missing.is_empty() {
            return None;
        }
        debug!("submit refused, {} empty fields", missing.len());
        self.missing = missing.clone();
        Some(Dispatch::Incomplete(missing))
    }

    fn spawn_list(&mut self, operation: Operation) {
        let store = Arc::clone(&self.store);
        self.spawn(operation, async move { Outcome::Listed(store.list_all().await) });
    }

    fn spawn<F>(&mut self, operation: Operation, future: F)
    where
        F: std::future::Future<Output = Outcome> + Send + 'static,
    {
        debug!(?operation, "store call started");
        self.in_flight = Some(InFlight {
            operation,
            handle: TaskHandle::spawn(&self.runtime, future),
        });
    }
}

/// Keep the first record for each id.
fn dedupe(records: Vec<Record>) -> Vec<Record> {
    let mut seen = std::collections::HashSet::new();
    let before = records.len();
    let unique: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if unique.len() != before {
        warn!("store returned {} duplicate ids", before - unique.len());
    }
    unique
}
