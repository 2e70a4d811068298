//! Pool lifecycle phases.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a `WorkerPool`.
///
/// State transitions:
/// - Running -> Draining (shutdown requested)
/// - Draining -> Stopped (queue empty, every worker has exited)
///
/// There is no way back to Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPhase {
    /// Accepting submissions; workers dispatch normally.
    Running,

    /// Stop requested. Submissions fail, workers keep consuming the queue.
    Draining,

    /// Queue empty and all workers terminated.
    Stopped,
}

impl PoolPhase {
    pub(crate) fn derive(stopped: bool, queued: usize, live_workers: usize) -> Self {
        if !stopped {
            PoolPhase::Running
        } else if queued > 0 || live_workers > 0 {
            PoolPhase::Draining
        } else {
            PoolPhase::Stopped
        }
    }
}
