//! PoolBuilder - WorkerPool の構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: スレッドを 1 本も起動する前に設定を検証

use super::WorkerPool;
use crate::config::PoolConfig;
use crate::error::PoolError;

/// Fluent construction of a `WorkerPool`.
///
/// # 使用例
/// ```ignore
/// let pool = WorkerPool::builder()
///     .size(8)
///     .thread_name_prefix("reduce")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoolBuilder {
    config: PoolConfig,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config (e.g. `PoolConfig::from_env()`).
    pub fn from_config(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.config.stack_size = Some(bytes);
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Validate the config and spawn the workers.
    ///
    /// # 検証
    /// - size == 0 なら `PoolError::InvalidSize`
    /// - thread_name_prefix が空なら `PoolError::InvalidConfig`
    pub fn build(self) -> Result<WorkerPool, PoolError> {
        WorkerPool::with_config(self.config)
    }
}
