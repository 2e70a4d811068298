//! ResultHandle - タスク結果の受け取り口
//!
//! # 学習ポイント
//! - oneshot channel による 1:1 の結果受け渡し
//! - 同期 (`get`) と非同期 (`.await`) の両方から使える Future 実装

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::TaskError;

pub(crate) type Outcome<T> = Result<T, TaskError>;

/// One-shot handle to the outcome of a submitted task.
///
/// Created by `WorkerPool::submit`, fulfilled exactly once by the worker that
/// runs the task. Dropping the handle discards the outcome; the task still runs.
///
/// # 使用例
/// ```ignore
/// let handle = pool.submit(|| 1 + 1)?;
/// assert_eq!(handle.get()?, 2);
/// ```
#[must_use = "dropping a ResultHandle discards the task's result and any panic it raised"]
#[derive(Debug)]
pub struct ResultHandle<T> {
    rx: oneshot::Receiver<Outcome<T>>,
}

/// Sending half, moved into the task closure.
pub(crate) struct ResultSlot<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

pub(crate) fn channel<T>() -> (ResultSlot<T>, ResultHandle<T>) {
    let (tx, rx) = oneshot::channel();
    (ResultSlot { tx }, ResultHandle { rx })
}

impl<T> ResultSlot<T> {
    /// Fulfil the handle. The receiver may already be gone; that is not an error.
    pub(crate) fn fulfil(self, outcome: Outcome<T>) {
        let _ = self.tx.send(outcome);
    }
}

impl<T> ResultHandle<T> {
    /// Block the calling thread until the task finishes.
    ///
    /// # Panics
    /// Panics when called from inside an async runtime. `.await` the handle
    /// there instead.
    pub fn get(self) -> Result<T, TaskError> {
        self.rx.blocking_recv().unwrap_or(Err(TaskError::Abandoned))
    }

    /// Non-blocking poll. `None` while the task is still queued or running.
    ///
    /// The outcome is handed out once; polling again afterwards reports
    /// `TaskError::Abandoned`.
    pub fn try_get(&mut self) -> Option<Result<T, TaskError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(TaskError::Abandoned)),
        }
    }
}

impl<T> Future for ResultHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TaskError::Abandoned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_fulfilled_value() {
        let (slot, handle) = channel::<u32>();
        slot.fulfil(Ok(7));
        assert_eq!(handle.get(), Ok(7));
    }

    #[test]
    fn dropped_slot_reports_abandoned() {
        let (slot, handle) = channel::<u32>();
        drop(slot);
        assert_eq!(handle.get(), Err(TaskError::Abandoned));
    }

    #[test]
    fn try_get_is_none_until_fulfilled() {
        let (slot, mut handle) = channel::<&str>();
        assert!(handle.try_get().is_none());

        slot.fulfil(Ok("done"));
        assert_eq!(handle.try_get(), Some(Ok("done")));
    }

    #[test]
    fn fulfil_after_handle_dropped_is_silent() {
        let (slot, handle) = channel::<u32>();
        drop(handle);
        slot.fulfil(Ok(1));
    }

    #[tokio::test]
    #[should_panic]
    async fn get_inside_runtime_panics() {
        let (slot, handle) = channel::<u32>();
        slot.fulfil(Ok(1));
        let _ = handle.get();
    }

    #[tokio::test]
    async fn handle_can_be_awaited() {
        let (slot, handle) = channel::<String>();
        std::thread::spawn(move || slot.fulfil(Ok("async".to_string())));
        assert_eq!(handle.await, Ok("async".to_string()));
    }
}
