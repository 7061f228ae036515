//! Per-operation results and the sinks that report them
//!
//! Results arrive in completion order, not list order. Sinks only observe;
//! they have no way to steer the pool.

use crate::core::OpContext;
use crate::error::BatchCopyError;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// How one operation ended
#[derive(Debug)]
pub enum Outcome {
    /// Transfer finished
    Success {
        /// Where the data was written
        dest: PathBuf,
        /// Bytes written
        bytes_written: u64,
    },
    /// Transfer failed; nothing is rolled back
    Failure {
        /// Why it failed
        error: BatchCopyError,
    },
}

/// Outcome of one operation, tagged with the worker that ran it
#[derive(Debug)]
pub struct BatchResult {
    /// 1-based worker identity
    pub worker_id: usize,
    /// Origin of the operation
    pub context: OpContext,
    /// Success or failure
    pub outcome: Outcome,
    /// Wall time spent in the transfer
    pub elapsed: Duration,
}

impl BatchResult {
    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Bytes written, 0 for failures
    pub fn bytes_written(&self) -> u64 {
        match self.outcome {
            Outcome::Success { bytes_written, .. } => bytes_written,
            Outcome::Failure { .. } => 0,
        }
    }
}

/// Consumes results as workers produce them
pub trait ResultSink {
    /// Called once per completed operation
    fn record(&mut self, result: &BatchResult);
}

impl<F: FnMut(&BatchResult)> ResultSink for F {
    fn record(&mut self, result: &BatchResult) {
        self(result)
    }
}

/// Reports results through the log
#[derive(Debug, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn record(&mut self, result: &BatchResult) {
        match &result.outcome {
            Outcome::Success { dest, bytes_written } => info!(
                "worker {}; line {}: {} ({})",
                result.worker_id,
                result.context.origin_line,
                dest.display(),
                humansize::format_size(*bytes_written, humansize::BINARY)
            ),
            Outcome::Failure { error } => error!(
                "worker {}; line {}: {}",
                result.worker_id, result.context.origin_line, error
            ),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    worker: usize,
    file: &'a str,
    line: usize,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a PathBuf>,
    bytes_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    elapsed_ms: u128,
}

/// Writes one JSON object per result per line
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    /// Write records to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &JsonRecord<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn record(&mut self, result: &BatchResult) {
        let (path, error) = match &result.outcome {
            Outcome::Success { dest, .. } => (Some(dest), None),
            Outcome::Failure { error } => (error.path(), Some(error.to_string())),
        };
        let record = JsonRecord {
            worker: result.worker_id,
            file: &result.context.origin_file,
            line: result.context.origin_line,
            success: result.is_success(),
            path,
            bytes_written: result.bytes_written(),
            error,
            elapsed_ms: result.elapsed.as_millis(),
        };

        if let Err(e) = self.write_record(&record) {
            error!("failed to write result for line {}: {}", result.context.origin_line, e);
        }
    }
}

/// Totals for one batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Operations in the batch
    pub total: usize,
    /// Operations handed to a worker
    pub dispatched: usize,
    /// Operations that succeeded
    pub succeeded: usize,
    /// Operations that failed
    pub failed: usize,
    /// Bytes written by successful operations
    pub bytes_written: u64,
    /// Most operations executing at the same time
    pub peak_in_flight: usize,
    /// Dispatch stopped because of a cancellation request
    pub cancelled: bool,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Operations never started because of cancellation
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.dispatched)
    }

    /// True when every dispatched operation succeeded and none were skipped
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped() == 0
    }

    /// Log the summary
    pub fn log(&self) {
        info!(
            "{} succeeded, {} failed, {} copied in {:.2?}",
            self.succeeded,
            self.failed,
            humansize::format_size(self.bytes_written, humansize::BINARY),
            self.elapsed
        );
        if self.cancelled {
            info!("{} operations were not started (interrupted)", self.skipped());
        }
    }
}
