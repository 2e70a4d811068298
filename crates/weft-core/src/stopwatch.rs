//! Re-enterable stopwatch for timing benchmark sections.

use std::time::{Duration, Instant};

use crate::error::StopwatchError;

/// Accumulates wall-clock time over any number of start/pause segments.
///
/// ```ignore
/// let mut sw = Stopwatch::new();
/// sw.start()?;
/// run();
/// sw.pause();
/// println!("{:.3}s over {} runs", sw.elapsed_secs(), sw.start_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    elapsed: Duration,
    start_count: usize,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a segment. Starting a running stopwatch is an error.
    pub fn start(&mut self) -> Result<(), StopwatchError> {
        if self.started_at.is_some() {
            return Err(StopwatchError::AlreadyRunning);
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// End the current segment. No-op when not running.
    pub fn pause(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed += started_at.elapsed();
            self.start_count += 1;
        }
    }

    /// Stop and clear all accumulated time.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time accumulated over completed segments. A running segment is not
    /// included until `pause`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Number of completed start/pause segments.
    pub fn start_count(&self) -> usize {
        self.start_count
    }
}
