//! Worker pool and dispatch coordinator
//!
//! The calling thread acts as coordinator: it pushes operations one at a
//! time into a zero-capacity queue, so each push waits for an idle worker
//! and at most `workers` operations are ever in flight. Before every push
//! the coordinator checks the cancellation signal, and while blocked it
//! races the push against that signal. Once dispatch stops the queue is
//! closed; workers finish what they hold, drain, and exit.
//!
//! Results travel over a second zero-capacity channel to a collector
//! thread that feeds the result sink in completion order.

use crate::core::{
    BatchResult, BatchSummary, CancelSignal, Operation, Outcome, ResultSink, Transport,
};
use crate::error::{BatchCopyError, Result};
use crate::fs::DEFAULT_BUFFER_SIZE;
use crate::progress::{format_progress, ProgressReporter};
use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::select;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads (at least 1)
    pub workers: usize,
    /// Minimum time between progress lines of one operation
    pub progress_interval: Duration,
    /// Buffer size for streamed copies
    pub buffer_size: usize,
    /// HTTP connect timeout
    pub connect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            progress_interval: Duration::from_secs(1),
            buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Tracks how many operations are executing right now
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Tally {
    succeeded: usize,
    failed: usize,
    bytes_written: u64,
}

/// Fixed-size pool of transfer workers
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    config: PoolConfig,
}

impl WorkerPool {
    /// Create a pool with the given configuration
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run a batch to completion or cancellation
    ///
    /// Blocks until every dispatched operation has produced a result and
    /// every worker has exited. Per-operation failures end up in the sink
    /// and the summary; only problems setting up the pool are returned as
    /// errors, and those happen before any operation starts.
    pub fn run<S>(
        &self,
        operations: Vec<Operation>,
        cancel: &CancelSignal,
        sink: &mut S,
    ) -> Result<BatchSummary>
    where
        S: ResultSink + Send,
    {
        let start = Instant::now();
        let total = operations.len();
        let workers = self.config.workers;
        if workers == 0 {
            return Err(BatchCopyError::config("worker count must be at least 1"));
        }

        let transports = (0..workers)
            .map(|_| Transport::new(self.config.buffer_size, self.config.connect_timeout))
            .collect::<Result<Vec<_>>>()?;

        let in_flight = InFlight::default();
        let interval = self.config.progress_interval;

        info!("Starting {} operations across {} workers...", total, workers);

        thread::scope(|scope| -> Result<BatchSummary> {
            let (task_tx, task_rx) = bounded::<Operation>(0);
            let (result_tx, result_rx) = bounded::<BatchResult>(0);

            let collector = thread::Builder::new()
                .name("results".to_string())
                .spawn_scoped(scope, move || collect_results(result_rx, sink))
                .map_err(|e| BatchCopyError::ThreadPoolError(e.to_string()))?;

            let mut handles = Vec::with_capacity(workers);
            for (index, transport) in transports.into_iter().enumerate() {
                let worker_id = index + 1;
                let tasks = task_rx.clone();
                let results = result_tx.clone();
                let in_flight = &in_flight;
                let handle = thread::Builder::new()
                    .name(format!("worker-{}", worker_id))
                    .spawn_scoped(scope, move || {
                        run_worker(worker_id, transport, tasks, results, in_flight, interval)
                    })
                    .map_err(|e| BatchCopyError::ThreadPoolError(e.to_string()))?;
                handles.push(handle);
            }
            drop(task_rx);
            drop(result_tx);

            let (dispatched, cancelled) = dispatch(operations, &task_tx, cancel);
            drop(task_tx);
            debug!("intake queue closed after {} operations", dispatched);

            // Interrupts that arrive while draining are acknowledged only
            let (drained_tx, drained_rx) = bounded::<()>(0);
            let listener = thread::Builder::new()
                .name("interrupts".to_string())
                .spawn_scoped(scope, move || acknowledge_interrupts(cancel, drained_rx))
                .map_err(|e| BatchCopyError::ThreadPoolError(e.to_string()))?;

            debug!("waiting for workers to complete");
            let mut panicked = 0;
            for handle in handles {
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
            drop(drained_tx);
            let _ = listener.join();

            debug!("waiting for result collector to complete");
            let tally = collector
                .join()
                .map_err(|_| {
                    BatchCopyError::ThreadPoolError("result collector panicked".to_string())
                })?;

            if panicked > 0 {
                return Err(BatchCopyError::ThreadPoolError(format!(
                    "{} worker(s) panicked",
                    panicked
                )));
            }

            Ok(BatchSummary {
                total,
                dispatched,
                succeeded: tally.succeeded,
                failed: tally.failed,
                bytes_written: tally.bytes_written,
                peak_in_flight: in_flight.peak(),
                cancelled,
                elapsed: start.elapsed(),
            })
        })
    }
}

/// Run a batch with default settings apart from the worker count
pub fn run_batch<S>(
    operations: Vec<Operation>,
    workers: usize,
    cancel: &CancelSignal,
    sink: &mut S,
) -> Result<BatchSummary>
where
    S: ResultSink + Send,
{
    let pool = WorkerPool::new(PoolConfig {
        workers,
        ..Default::default()
    });
    pool.run(operations, cancel, sink)
}

/// Push operations into the queue in list order until done or cancelled
///
/// Returns how many operations were handed to a worker and whether dispatch
/// stopped because of cancellation.
fn dispatch(
    operations: Vec<Operation>,
    tasks: &Sender<Operation>,
    cancel: &CancelSignal,
) -> (usize, bool) {
    let mut dispatched = 0;

    for op in operations {
        if cancel.is_cancelled() {
            warn_interrupted();
            return (dispatched, true);
        }

        let line = op.context().origin_line;
        select! {
            send(tasks, op) -> res => {
                if res.is_err() {
                    warn!("all workers exited; {} operations were not dispatched", dispatched);
                    return (dispatched, false);
                }
                debug!("dispatched line {}", line);
                dispatched += 1;
            }
            recv(cancel.receiver()) -> _ => {
                cancel.latch();
                warn_interrupted();
                return (dispatched, true);
            }
        }
    }

    (dispatched, false)
}

fn warn_interrupted() {
    warn!(
        "Interrupt detected, running operations will complete, \
         but new operations will not be started..."
    );
}

fn acknowledge_interrupts(cancel: &CancelSignal, drained: Receiver<()>) {
    loop {
        select! {
            recv(cancel.receiver()) -> _ => {
                cancel.latch();
                debug!("got interrupt while draining");
                warn_interrupted();
            }
            recv(drained) -> _ => break,
        }
    }
}

fn run_worker(
    worker_id: usize,
    transport: Transport,
    tasks: Receiver<Operation>,
    results: Sender<BatchResult>,
    in_flight: &InFlight,
    interval: Duration,
) -> usize {
    debug!("worker {}: starting", worker_id);
    let mut count = 0;

    for mut op in tasks.iter() {
        count += 1;
        in_flight.enter();

        let start = Instant::now();
        let context = op.context().clone();
        let line = context.origin_line;
        let mut reporter = ProgressReporter::new(interval, |so_far, goal| {
            info!("worker {}; line {}: {}", worker_id, line, format_progress(so_far, goal));
        });

        let outcome = match op.copy(&transport, Some(&mut reporter)) {
            Ok(bytes_written) => Outcome::Success {
                dest: op.dest().to_path_buf(),
                bytes_written,
            },
            Err(error) => Outcome::Failure { error },
        };
        in_flight.leave();

        let result = BatchResult {
            worker_id,
            context,
            outcome,
            elapsed: start.elapsed(),
        };
        if results.send(result).is_err() {
            break;
        }
    }

    debug!("worker {}: closed after {} operations", worker_id, count);
    count
}

fn collect_results<S: ResultSink>(results: Receiver<BatchResult>, sink: &mut S) -> Tally {
    debug!("result collector: starting");
    let mut tally = Tally::default();

    for result in results.iter() {
        match &result.outcome {
            Outcome::Success { bytes_written, .. } => {
                tally.succeeded += 1;
                tally.bytes_written += bytes_written;
            }
            Outcome::Failure { .. } => tally.failed += 1,
        }
        sink.record(&result);
    }

    debug!(
        "result collector: closed after {} results",
        tally.succeeded + tally.failed
    );
    tally
}
