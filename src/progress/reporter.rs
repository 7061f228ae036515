//! Throttled per-operation progress reporter
//!
//! A `ProgressReporter` sits beside the byte stream of one transfer, counts
//! what passes through it, and calls back with `(bytes_so_far, goal)` at most
//! once per reporting interval. The first chunk only starts the clock, so a
//! transfer that finishes inside one interval produces no progress output.

use std::io::Write;
use std::time::{Duration, Instant};

/// Receives byte-count updates from a running transfer
pub trait ProgressSink {
    /// Set the expected total size (0 = unknown)
    fn set_goal(&mut self, goal: u64);

    /// Record that `bytes` more bytes were written
    fn advance(&mut self, bytes: u64);

    /// Bytes recorded so far
    fn bytes_written(&self) -> u64;
}

/// Rate-limited progress reporter owned by a single in-flight operation
pub struct ProgressReporter<F>
where
    F: FnMut(u64, u64),
{
    so_far: u64,
    goal: u64,
    interval: Duration,
    last_report: Option<Instant>,
    callback: F,
}

impl<F> ProgressReporter<F>
where
    F: FnMut(u64, u64),
{
    /// Create a reporter that calls `callback` at most once per `interval`
    pub fn new(interval: Duration, callback: F) -> Self {
        Self {
            so_far: 0,
            goal: 0,
            interval,
            last_report: None,
            callback,
        }
    }

    /// Expected total size, 0 if unknown
    pub fn goal(&self) -> u64 {
        self.goal
    }

    /// Minimum time between two callbacks
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<F> ProgressSink for ProgressReporter<F>
where
    F: FnMut(u64, u64),
{
    fn set_goal(&mut self, goal: u64) {
        self.goal = goal;
    }

    fn advance(&mut self, bytes: u64) {
        self.so_far = self.so_far.saturating_add(bytes);

        let now = Instant::now();
        match self.last_report {
            None => {
                self.last_report = Some(now);
            }
            Some(last) if now.duration_since(last) >= self.interval => {
                self.last_report = Some(now);
                (self.callback)(self.so_far, self.goal);
            }
            Some(_) => {}
        }
    }

    fn bytes_written(&self) -> u64 {
        self.so_far
    }
}

/// Lets the reporter stand in for any byte sink; every chunk is accepted.
impl<F> Write for ProgressReporter<F>
where
    F: FnMut(u64, u64),
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.advance(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Format a progress update for display
///
/// A goal of 0 means the size is unknown, so only absolute bytes are shown.
pub fn format_progress(so_far: u64, goal: u64) -> String {
    let done = humansize::format_size(so_far, humansize::BINARY);
    if goal == 0 {
        return done;
    }

    let percent = (so_far as f64 / goal as f64) * 100.0;
    format!(
        "{} of {} ({:.1}%)",
        done,
        humansize::format_size(goal, humansize::BINARY),
        percent
    )
}
