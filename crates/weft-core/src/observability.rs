use serde::{Deserialize, Serialize};

use crate::pool::PoolPhase;

/// Point-in-time view of a pool. Fields are read without a global lock, so
/// they can be mutually stale by a few operations under load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Configured worker count.
    pub workers: usize,
    /// Worker threads that have not exited yet.
    pub live_workers: usize,
    pub idle: usize,
    pub queued: usize,
    pub phase: PoolPhase,
}

impl PoolStatus {
    /// Workers currently executing a task.
    pub fn busy(&self) -> usize {
        self.workers.saturating_sub(self.idle)
    }

    pub fn is_quiescent(&self) -> bool {
        self.queued == 0 && self.idle == self.workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_phase_as_snake_case() {
        let status = PoolStatus {
            workers: 4,
            live_workers: 4,
            idle: 3,
            queued: 2,
            phase: PoolPhase::Draining,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "draining");
        assert_eq!(json["queued"], 2);
        assert_eq!(status.busy(), 1);
        assert!(!status.is_quiescent());
    }
}
