//! weft-core
//!
//! Fixed-size worker pool with per-task result handles and a quiescence barrier.
//!
//! # モジュール構成
//! - **pool**: WorkerPool 本体（キュー、ワーカー、barrier、shutdown、builder）
//! - **handle**: ResultHandle（1 タスク 1 つの結果チャネル）
//! - **config**: PoolConfig（serde / 環境変数）
//! - **observability**: PoolStatus（状態のスナップショット）
//! - **stopwatch**: ベンチマーク計測用の Stopwatch
//! - **error**: PoolError / TaskError / StopwatchError

pub mod config;
pub mod error;
pub mod handle;
pub mod observability;
pub mod pool;
pub mod stopwatch;

pub use config::PoolConfig;
pub use error::{PoolError, StopwatchError, TaskError};
pub use handle::ResultHandle;
pub use observability::PoolStatus;
pub use pool::{PoolBuilder, PoolPhase, WorkerPool};
pub use stopwatch::Stopwatch;
