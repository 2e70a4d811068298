use std::any::Any;

use thiserror::Error;

/// Errors raised by the pool itself (construction and submission).
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool size must be at least 1 (got {0})")]
    InvalidSize(usize),

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("submit called on a stopped worker pool")]
    PoolStopped,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure of a single task, surfaced through its `ResultHandle`.
///
/// A task failure never takes down a worker; it is only visible to whoever
/// retrieves the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task panicked: {message}")]
    Panicked { message: String },

    #[error("task was dropped before producing a result")]
    Abandoned,
}

impl TaskError {
    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        TaskError::Panicked { message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopwatchError {
    #[error("stopwatch is already running")]
    AlreadyRunning,
}
