//! Background work for the UI loop.
//!
//! A future is spawned on the tokio runtime and its output comes back over a
//! oneshot channel, which the UI polls once per tick without blocking.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// State of a spawned task as seen from the UI thread.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskPoll<T> {
    Pending,
    Ready(T),
    /// The task ended without reporting (it panicked or was aborted).
    Dropped,
}

/// Receiving end of a spawned task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T: Send + 'static> TaskHandle<T> {
    pub fn spawn<F>(runtime: &Handle, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        runtime.spawn(async move {
            // The receiver is gone when the screen was torn down; nothing to report to.
            let _ = sender.send(future.await);
        });
        Self { receiver }
    }
}

impl<T> TaskHandle<T> {
    /// Non-blocking check for the task's output.
    pub fn try_take(&mut self) -> TaskPoll<T> {
        match self.receiver.try_recv() {
            Ok(value) => TaskPoll::Ready(value),
            Err(oneshot::error::TryRecvError::Empty) => TaskPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => TaskPoll::Dropped,
        }
    }

    /// Block the current thread until the task reports.
    ///
    /// Must not be called from inside the runtime's async context.
    pub fn wait(self) -> TaskPoll<T> {
        match self.receiver.blocking_recv() {
            Ok(value) => TaskPoll::Ready(value),
            Err(_) => TaskPoll::Dropped,
        }
    }
}
