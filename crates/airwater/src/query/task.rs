use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use super::error::Result;

#[derive(Debug)]
pub enum TaskOutcome<T> {
    Completed(Result<T>),
    TimedOut,
    Abandoned,
}

/// Runs one blocking engine call on its own thread.
///
/// The engine never spawns threads itself; callers that need to keep a
/// terminal or event loop responsive wrap calls in a task and decide how long
/// to wait. A result that arrives after [`QueryTask::join_timeout`] gave up is
/// dropped with the detached thread.
#[derive(Debug)]
pub struct QueryTask<T> {
    label: &'static str,
    receiver: Receiver<Result<T>>,
}

impl<T: Send + 'static> QueryTask<T> {
    pub fn spawn<F>(label: &'static str, job: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        thread::spawn(move || {
            let result = job();
            if sender.send(result).is_err() {
                tracing::debug!(task = label, "discarding late query result");
            }
        });
        Self { label, receiver }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn join(self) -> TaskOutcome<T> {
        match self.receiver.recv() {
            Ok(result) => TaskOutcome::Completed(result),
            Err(_) => TaskOutcome::Abandoned,
        }
    }

    pub fn join_timeout(self, timeout: Duration) -> TaskOutcome<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => TaskOutcome::Completed(result),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    task = self.label,
                    timeout_ms = timeout.as_millis() as u64,
                    "query task timed out"
                );
                TaskOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => TaskOutcome::Abandoned,
        }
    }
}

impl<T> TaskOutcome<T> {
    pub fn into_result(self, label: &str) -> std::result::Result<Result<T>, TaskFailure> {
        match self {
            Self::Completed(result) => Ok(result),
            Self::TimedOut => Err(TaskFailure::TimedOut(label.to_string())),
            Self::Abandoned => Err(TaskFailure::Abandoned(label.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskFailure {
    #[error("query task `{0}` timed out")]
    TimedOut(String),

    #[error("query task `{0}` stopped without a result")]
    Abandoned(String),
}

impl TaskFailure {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TimedOut(_) => "query_timeout",
            Self::Abandoned(_) => "query_abandoned",
        }
    }

    #[must_use]
    pub fn task(&self) -> &str {
        match self {
            Self::TimedOut(label) | Self::Abandoned(label) => label,
        }
    }
}
