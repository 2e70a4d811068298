//! Fixed-size worker pool: FIFO dispatch, per-task result handles, barrier.

mod builder;
mod queue;
mod quiescence;
mod state;
mod worker;

pub use builder::PoolBuilder;
pub use state::PoolPhase;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{info, trace, warn};

use self::queue::{Job, TaskQueue};
use self::quiescence::Quiescence;
use self::worker::Worker;
use crate::config::PoolConfig;
use crate::error::{PoolError, TaskError};
use crate::handle::{self, ResultHandle};
use crate::observability::PoolStatus;

/// State shared between the pool handle and its worker threads.
pub(crate) struct Shared {
    queue: TaskQueue,
    quiescence: Quiescence,
    live_workers: AtomicUsize,
    /// Set once every worker is spawned, before any task can run.
    worker_threads: OnceLock<Vec<ThreadId>>,
}

impl Shared {
    fn new(size: usize) -> Self {
        Self {
            queue: TaskQueue::new(),
            quiescence: Quiescence::new(size),
            live_workers: AtomicUsize::new(0),
            worker_threads: OnceLock::new(),
        }
    }

    pub(crate) fn worker_exited(&self) {
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }

    fn on_worker_thread(&self) -> bool {
        let current = thread::current().id();
        self.worker_threads
            .get()
            .is_some_and(|ids| ids.contains(&current))
    }

    fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::Acquire)
    }
}

/// A fixed set of worker threads consuming one shared FIFO queue.
///
/// - `submit` enqueues a closure and returns a `ResultHandle` immediately.
/// - `barrier` blocks until the queue is empty and every worker is idle.
/// - `shutdown` (also run on drop) stops intake, drains the queue and joins
///   the workers.
///
/// The pool is `Sync`; share it behind an `Arc` to submit from several threads.
pub struct WorkerPool {
    config: PoolConfig,
    shared: Arc<Shared>,
    workers: Mutex<Vec<Worker>>,
}

impl WorkerPool {
    /// Spawn a pool of `size` workers with default settings.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        Self::builder().size(size).build()
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let shared = Arc::new(Shared::new(config.size));
        let mut workers = Vec::with_capacity(config.size);
        for id in 0..config.size {
            shared.live_workers.fetch_add(1, Ordering::AcqRel);
            match Worker::spawn(id, &config, Arc::clone(&shared)) {
                Ok(worker) => workers.push(worker),
                Err(err) => {
                    shared.live_workers.fetch_sub(1, Ordering::AcqRel);
                    warn!(error = %err, spawned = workers.len(), "failed to spawn worker, stopping pool");
                    shared.queue.stop();
                    for worker in workers {
                        worker.join();
                    }
                    return Err(err);
                }
            }
        }

        let _ = shared
            .worker_threads
            .set(workers.iter().map(Worker::thread_id).collect());

        info!(
            workers = config.size,
            prefix = %config.thread_name_prefix,
            "worker pool started"
        );

        Ok(Self {
            config,
            shared,
            workers: Mutex::new(workers),
        })
    }

    /// Queue `task` for execution and return a handle to its result.
    ///
    /// Bind arguments by capturing them: `pool.submit(move || reduce(&buf, 0, n, 1))`.
    /// A panic inside `task` is caught and reported through the handle as
    /// `TaskError::Panicked`; the worker keeps running.
    ///
    /// Fails with `PoolError::PoolStopped` once shutdown has begun. Nothing is
    /// queued in that case.
    pub fn submit<F, T>(&self, task: F) -> Result<ResultHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (slot, handle) = handle::channel();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(TaskError::from_panic);
            if let Err(TaskError::Panicked { message }) = &outcome {
                warn!(%message, "task panicked");
            }
            slot.fulfil(outcome);
        });

        self.shared.queue.push(job)?;
        trace!("task queued");
        Ok(handle)
    }

    /// Block until the queue is empty and no worker holds an unfinished task.
    ///
    /// This is a point-in-time check. Work submitted by other threads while
    /// the barrier waits races with its wake-up: the barrier may return before
    /// or after such work, and a steady stream of submissions can keep it
    /// waiting indefinitely. Calling it from inside a task never returns.
    pub fn barrier(&self) {
        let shared = &self.shared;
        // Queue first: a worker claims (idle -1) under the queue lock, so an
        // empty queue read before the idle count cannot miss a claim.
        shared
            .quiescence
            .wait_until(|| shared.queue.is_empty() && shared.quiescence.all_idle());
    }

    /// Stop accepting work, drain the queue, and join every worker.
    ///
    /// Safe to call more than once and from several threads; later calls
    /// block until the first one has joined the workers, then return.
    ///
    /// Called from inside a task it only stops intake and returns. The
    /// calling worker drains the queue and exits on its own, and whoever
    /// owns the pool joins it.
    pub fn shutdown(&self) {
        if self.shared.on_worker_thread() {
            if self.shared.queue.stop() {
                warn!("worker pool shut down from one of its own tasks");
            }
            return;
        }

        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        if workers.is_empty() {
            return;
        }

        if self.shared.queue.stop() {
            info!(
                workers = workers.len(),
                queued = self.shared.queue.len(),
                "shutting down worker pool"
            );
        }

        for worker in workers.drain(..) {
            worker.join();
        }
        info!("worker pool stopped");
    }

    /// Configured number of workers.
    pub fn size(&self) -> usize {
        self.shared.quiescence.total()
    }

    pub fn idle(&self) -> usize {
        self.shared.quiescence.idle()
    }

    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.queue.is_stopped()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn phase(&self) -> PoolPhase {
        self.status().phase
    }

    pub fn status(&self) -> PoolStatus {
        let (queued, stopped) = self.shared.queue.snapshot();
        let live_workers = self.shared.live_workers();
        PoolStatus {
            workers: self.size(),
            live_workers,
            idle: self.idle(),
            queued,
            phase: PoolPhase::derive(stopped, queued, live_workers),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
