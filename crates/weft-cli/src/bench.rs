// Reduction benchmark over a WorkerPool.
//
// Design Decision: Share the buffer as Arc<[f64]> so tasks stay 'static.
// Design Decision: One task per worker; the driver sums the partials.

use std::ops::Range;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};
use weft_core::{PoolStatus, Stopwatch, WorkerPool};

/// How the buffer is split across tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Task `i` of `n` reads every `n`-th element starting at `i`.
    Strided,
    /// Task `i` of `n` reads one contiguous block.
    Blocked,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub elements: usize,
    pub value: f64,
    pub partitions: Vec<Partition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeReport {
    pub partition: Partition,
    pub tasks: usize,
    pub total: f64,
    pub expected: f64,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub started_at: DateTime<Utc>,
    pub elements: usize,
    pub value: f64,
    pub workers: usize,
    pub modes: Vec<ModeReport>,
    pub pool: PoolStatus,
}

/// Sum `buf[start], buf[start + stride], ...` for indices below `end`.
///
/// Main loop is unrolled 4x; the tail is summed one element at a time.
/// `end` is clamped to the buffer length. `stride` must be non-zero.
pub fn reduce(buf: &[f64], start: usize, end: usize, stride: usize) -> f64 {
    assert!(stride > 0, "stride must be non-zero");
    let end = end.min(buf.len());

    let (s1, s2, s3) = (stride, stride * 2, stride * 3);
    let step = stride * 4;

    let mut sum = 0.0;
    let mut i = start;
    while i + s3 < end {
        let a = buf[i] + buf[i + s2];
        let b = buf[i + s1] + buf[i + s3];
        sum += a + b;
        i += step;
    }
    while i < end {
        sum += buf[i];
        i += stride;
    }
    sum
}

/// Index range of block `index` when `len` elements are split into `parts`.
pub fn block_range(len: usize, parts: usize, index: usize) -> Range<usize> {
    (index * len / parts)..((index + 1) * len / parts)
}

/// Submit one reduction per part and add up the partial sums.
pub fn reduce_on_pool(
    pool: &WorkerPool,
    buf: &Arc<[f64]>,
    partition: Partition,
    parts: usize,
) -> Result<f64> {
    let len = buf.len();
    let handles = (0..parts)
        .map(|i| {
            let buf = Arc::clone(buf);
            let (start, end, stride) = match partition {
                Partition::Strided => (i, len, parts),
                Partition::Blocked => {
                    let range = block_range(len, parts, i);
                    (range.start, range.end, 1)
                }
            };
            pool.submit(move || reduce(&buf, start, end, stride))
        })
        .collect::<Result<Vec<_>, _>>()
        .context("failed to submit reduction")?;

    let mut total = 0.0;
    for (i, handle) in handles.into_iter().enumerate() {
        let partial = handle
            .get()
            .with_context(|| format!("reduction task {i} failed"))?;
        debug!(task = i, partial, "partial sum");
        total += partial;
    }
    Ok(total)
}

/// Fill the buffer, run every requested partition, and collect timings.
pub fn run(pool: &WorkerPool, config: &BenchConfig) -> Result<BenchReport> {
    let started_at = Utc::now();
    let buf: Arc<[f64]> = vec![config.value; config.elements].into();
    let parts = pool.size();
    let expected = config.elements as f64 * config.value;

    let mut stopwatch = Stopwatch::new();
    let mut modes = Vec::with_capacity(config.partitions.len());
    for &partition in &config.partitions {
        stopwatch.reset();
        stopwatch.start()?;
        let total = reduce_on_pool(pool, &buf, partition, parts)?;
        stopwatch.pause();

        info!(
            ?partition,
            total,
            elapsed_secs = stopwatch.elapsed_secs(),
            "reduction finished"
        );
        modes.push(ModeReport {
            partition,
            tasks: parts,
            total,
            expected,
            elapsed_secs: stopwatch.elapsed_secs(),
        });
    }

    pool.barrier();

    Ok(BenchReport {
        started_at,
        elements: config.elements,
        value: config.value,
        workers: pool.size(),
        modes,
        pool: pool.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn naive(buf: &[f64], start: usize, end: usize, stride: usize) -> f64 {
        buf[..end.min(buf.len())]
            .iter()
            .skip(start)
            .step_by(stride)
            .sum()
    }

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[rstest]
    #[case::contiguous(0, 1)]
    #[case::offset(3, 1)]
    #[case::stride_two(1, 2)]
    #[case::stride_four(2, 4)]
    #[case::wide_stride(5, 7)]
    fn reduce_matches_naive_sum(#[case] start: usize, #[case] stride: usize) {
        for len in [0, 1, 3, 4, 5, 16, 17, 103] {
            let buf = ramp(len);
            assert_eq!(
                reduce(&buf, start, len, stride),
                naive(&buf, start, len, stride),
                "len={len} start={start} stride={stride}"
            );
        }
    }

    #[test]
    fn reduce_clamps_end_to_buffer() {
        let buf = ramp(10);
        assert_eq!(reduce(&buf, 0, 1_000, 1), 45.0);
    }

    #[test]
    fn reduce_with_start_past_end_is_zero() {
        let buf = ramp(4);
        assert_eq!(reduce(&buf, 9, 4, 1), 0.0);
    }

    #[rstest]
    #[case(10, 3)]
    #[case(1000, 8)]
    #[case(5, 8)]
    fn blocks_cover_buffer_exactly_once(#[case] len: usize, #[case] parts: usize) {
        let mut covered = vec![0_u8; len];
        for i in 0..parts {
            for j in block_range(len, parts, i) {
                covered[j] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[rstest]
    #[case::strided(Partition::Strided)]
    #[case::blocked(Partition::Blocked)]
    fn pool_reduction_sums_whole_buffer(#[case] partition: Partition) {
        let pool = WorkerPool::new(4).unwrap();
        let buf: Arc<[f64]> = vec![2.0; 1001].into();

        let total = reduce_on_pool(&pool, &buf, partition, pool.size()).unwrap();
        assert_eq!(total, 2002.0);
    }

    #[test]
    fn run_reports_every_partition() {
        let pool = WorkerPool::new(3).unwrap();
        let config = BenchConfig {
            elements: 4096,
            value: 0.5,
            partitions: vec![Partition::Strided, Partition::Blocked],
        };

        let report = run(&pool, &config).unwrap();
        assert_eq!(report.modes.len(), 2);
        assert_eq!(report.workers, 3);
        for mode in &report.modes {
            assert_eq!(mode.total, 2048.0);
            assert_eq!(mode.expected, 2048.0);
            assert_eq!(mode.tasks, 3);
        }
        assert!(report.pool.is_quiescent());
    }
}
