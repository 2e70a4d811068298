//! Worker - ワーカースレッドと実行ループ
//!
//! # 学習ポイント
//! - `thread::Builder` による名前付きスレッドの起動（失敗は `?` で伝播）
//! - pop→execute→release のループ（実行中はキューのロックを持たない）
//! - stop 後もキューが空になるまで消化してから終了（graceful drain）

use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use tracing::{debug, warn};

use super::Shared;
use crate::config::PoolConfig;
use crate::error::PoolError;

/// One long-lived worker thread.
pub(crate) struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawn worker `id` running `worker_loop` on a named thread.
    pub(crate) fn spawn(
        id: usize,
        config: &PoolConfig,
        shared: Arc<Shared>,
    ) -> Result<Self, PoolError> {
        let mut builder = thread::Builder::new().name(config.thread_name(id));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder.spawn(move || worker_loop(id, &shared))?;
        Ok(Self { id, handle })
    }

    pub(crate) fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Wait for the thread to exit. Never called from a worker thread.
    pub(crate) fn join(self) {
        if self.handle.join().is_err() {
            warn!(worker = self.id, "worker thread panicked");
        }
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    debug!(worker = id, "worker started");

    // pop() returns None only once the queue is stopped and empty
    while let Some(job) = shared.queue.pop(&shared.quiescence) {
        job();
        shared.quiescence.release();
    }

    shared.worker_exited();
    debug!(worker = id, "worker exiting");
}
