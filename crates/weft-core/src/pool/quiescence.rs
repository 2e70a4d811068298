//! Idle-worker accounting and the quiescence condition used by `barrier`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

/// Tracks how many workers are idle and lets callers wait for all of them.
///
/// The counter is atomic so claim/release never touch the queue lock. The
/// mutex here only pairs the condvar's wait and notify; it guards no data.
pub(crate) struct Quiescence {
    total: usize,
    idle: AtomicUsize,
    lock: Mutex<()>,
    settled: Condvar,
}

impl Quiescence {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            idle: AtomicUsize::new(total),
            lock: Mutex::new(()),
            settled: Condvar::new(),
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn idle(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    pub(crate) fn all_idle(&self) -> bool {
        self.idle() == self.total
    }

    /// A worker took a job off the queue.
    pub(crate) fn claim(&self) {
        self.idle.fetch_sub(1, Ordering::AcqRel);
    }

    /// A worker finished its job. Wakes every barrier waiter.
    pub(crate) fn release(&self) {
        self.idle.fetch_add(1, Ordering::AcqRel);

        // Notify under the lock: a waiter that has just evaluated its
        // predicate is either already parked or will see the new count.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.settled.notify_all();
    }

    /// Block until `settled` returns true. Re-evaluated after every release.
    pub(crate) fn wait_until(&self, mut settled: impl FnMut() -> bool) {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .settled
            .wait_while(guard, |_| !settled())
            .unwrap_or_else(PoisonError::into_inner);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn starts_fully_idle() {
        let q = Quiescence::new(3);
        assert_eq!(q.total(), 3);
        assert_eq!(q.idle(), 3);
        assert!(q.all_idle());
    }

    #[test]
    fn claim_and_release_balance() {
        let q = Quiescence::new(2);
        q.claim();
        q.claim();
        assert_eq!(q.idle(), 0);
        assert!(!q.all_idle());

        q.release();
        q.release();
        assert!(q.all_idle());
    }

    #[test]
    fn wait_returns_immediately_when_settled() {
        let q = Quiescence::new(1);
        q.wait_until(|| q.all_idle());
    }

    #[test]
    fn release_wakes_waiter() {
        let q = Arc::new(Quiescence::new(1));
        q.claim();

        let waiter = thread::spawn({
            let q = Arc::clone(&q);
            move || q.wait_until(|| q.all_idle())
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        q.release();
        waiter.join().unwrap();
    }
}
