//! TaskQueue - ワーカー間で共有する FIFO キュー
//!
//! # 学習ポイント
//! - Mutex + Condvar による blocking pop
//! - stop フラグもキューと同じロックで守る（stop 後の enqueue を確実に拒否する）

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::quiescence::Quiescence;
use crate::error::PoolError;

/// A type-erased unit of work. Result delivery is captured inside the closure.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,

    /// Monotonic false -> true, only written under the queue lock.
    stop: bool,
}

/// Shared FIFO queue plus the dispatch condition.
///
/// # 実装詳細
/// - `jobs` と `stop` は 1 つの Mutex で排他制御
/// - push 時は `notify_one`（1 ワーカーだけ起こす）
/// - stop 時は `notify_all`（全ワーカーが stop を観測する必要がある）
pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                stop: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    // Jobs run outside the lock and catch their own panics, so a poisoned
    // guard still protects a consistent queue.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a job and wake one waiting worker.
    pub(crate) fn push(&self, job: Job) -> Result<(), PoolError> {
        {
            let mut state = self.lock();
            if state.stop {
                return Err(PoolError::PoolStopped);
            }
            state.jobs.push_back(job);
        }
        self.not_empty.notify_one();
        Ok(())
    }

    /// Block until a job is available and claim it.
    ///
    /// The idle counter is decremented while the queue lock is still held, so a
    /// barrier that sees an empty queue also sees the claim. Returns `None`
    /// once the queue is stopped and drained.
    pub(crate) fn pop(&self, quiescence: &Quiescence) -> Option<Job> {
        let guard = self.lock();
        let mut state = self
            .not_empty
            .wait_while(guard, |s| !s.stop && s.jobs.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        let job = state.jobs.pop_front()?;
        quiescence.claim();
        Some(job)
    }

    /// Set the stop flag and wake every worker. Returns `false` if the queue
    /// was already stopped.
    pub(crate) fn stop(&self) -> bool {
        let first = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.stop, true)
        };
        self.not_empty.notify_all();
        first
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.lock().stop
    }

    /// Queue length and stop flag read under one lock acquisition.
    pub(crate) fn snapshot(&self) -> (usize, bool) {
        let state = self.lock();
        (state.jobs.len(), state.stop)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn counting_job(counter: &Arc<AtomicUsize>, value: usize) -> Job {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.store(value, Ordering::SeqCst);
        })
    }

    #[test]
    fn pop_is_fifo() {
        let queue = TaskQueue::new();
        let quiescence = Quiescence::new(1);
        let seen = Arc::new(AtomicUsize::new(0));

        queue.push(counting_job(&seen, 1)).unwrap();
        queue.push(counting_job(&seen, 2)).unwrap();
        assert_eq!(queue.len(), 2);

        (queue.pop(&quiescence).unwrap())();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        quiescence.release();

        (queue.pop(&quiescence).unwrap())();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        quiescence.release();

        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn pop_claims_an_idle_slot() {
        let queue = TaskQueue::new();
        let quiescence = Quiescence::new(2);
        queue.push(Box::new(|| {})).unwrap();

        let _job = queue.pop(&quiescence).unwrap();
        assert_eq!(quiescence.idle(), 1);
    }

    #[test]
    fn push_after_stop_is_rejected_and_not_queued() {
        let queue = TaskQueue::new();
        assert!(queue.stop());

        let err = queue.push(Box::new(|| {})).unwrap_err();
        assert!(matches!(err, PoolError::PoolStopped));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn stop_is_reported_once() {
        let queue = TaskQueue::new();
        assert!(queue.stop());
        assert!(!queue.stop());
        assert!(queue.is_stopped());
    }

    #[test]
    fn stopped_queue_still_drains() {
        let queue = TaskQueue::new();
        let quiescence = Quiescence::new(1);
        queue.push(Box::new(|| {})).unwrap();
        queue.stop();

        assert!(queue.pop(&quiescence).is_some());
        quiescence.release();
        assert!(queue.pop(&quiescence).is_none());
    }

    #[test]
    fn push_wakes_blocked_pop() {
        let queue = Arc::new(TaskQueue::new());
        let quiescence = Arc::new(Quiescence::new(1));

        let waiter = thread::spawn({
            let queue = Arc::clone(&queue);
            let quiescence = Arc::clone(&quiescence);
            move || queue.pop(&quiescence).is_some()
        });

        thread::sleep(Duration::from_millis(50));
        queue.push(Box::new(|| {})).unwrap();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn stop_wakes_blocked_pop() {
        let queue = Arc::new(TaskQueue::new());
        let quiescence = Arc::new(Quiescence::new(1));

        let waiter = thread::spawn({
            let queue = Arc::clone(&queue);
            let quiescence = Arc::clone(&quiescence);
            move || queue.pop(&quiescence).is_none()
        });

        thread::sleep(Duration::from_millis(50));
        queue.stop();
        assert!(waiter.join().unwrap());
    }
}
