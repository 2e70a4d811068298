//! Pool configuration.

use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

pub const DEFAULT_THREAD_PREFIX: &str = "weft-worker";

/// Settings for a `WorkerPool`.
///
/// Environment variables (see `from_env`):
/// - `WEFT_POOL_SIZE`: number of workers (default: available parallelism)
/// - `WEFT_THREAD_PREFIX`: worker thread name prefix (default: `weft-worker`)
/// - `WEFT_STACK_SIZE`: worker stack size in bytes (default: platform default)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads. Fixed for the lifetime of the pool.
    pub size: usize,

    /// Worker threads are named `{thread_name_prefix}-{index}`.
    pub thread_name_prefix: String,

    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl PoolConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Read the config from `WEFT_*` variables. Unset or unparsable values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let size = std::env::var("WEFT_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.size);

        let thread_name_prefix = std::env::var("WEFT_THREAD_PREFIX")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.thread_name_prefix);

        let stack_size = std::env::var("WEFT_STACK_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(defaults.stack_size);

        Self {
            size,
            thread_name_prefix,
            stack_size,
        }
    }

    /// Fail-fast check run before any thread is spawned.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.size == 0 {
            return Err(PoolError::InvalidSize(self.size));
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(PoolError::InvalidConfig(
                "thread_name_prefix must not be empty".to_string(),
            ));
        }
        if self.stack_size == Some(0) {
            return Err(PoolError::InvalidConfig(
                "stack_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index)
    }
}

fn default_size() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
