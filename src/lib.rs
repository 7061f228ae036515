//! # batchcopy - Parallel Batch Copy and Download
//!
//! batchcopy executes a list of transfer operations (local file copies and
//! HTTP downloads) with a fixed number of worker threads. Each running
//! transfer reports throttled progress, each finished one produces a
//! result, and an interrupt stops dispatch while letting running transfers
//! complete.
//!
//! ## Quick Start
//!
//! ```no_run
//! use batchcopy::core::{run_batch, CancelSignal, LogSink};
//! use batchcopy::list::load_list;
//! use std::path::Path;
//!
//! let ops = load_list(Path::new("files.txt"), Path::new("/data"), Path::new("/backup")).unwrap();
//! let summary = run_batch(ops, 4, &CancelSignal::never(), &mut LogSink).unwrap();
//!
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! ```
//!
//! ## Custom Pool Settings
//!
//! ```no_run
//! use batchcopy::core::{
//!     cancel_channel, BatchResult, OpContext, Operation, PoolConfig, WorkerPool,
//! };
//! use std::time::Duration;
//!
//! let ops = vec![Operation::local("/data/a.txt", "/backup/a.txt", OpContext::new("inline", 1))];
//! let pool = WorkerPool::new(PoolConfig {
//!     workers: 2,
//!     progress_interval: Duration::from_millis(500),
//!     ..Default::default()
//! });
//!
//! let (handle, signal) = cancel_channel();
//! ctrlc::set_handler(move || handle.cancel()).unwrap();
//!
//! let mut failures = 0;
//! let summary = pool
//!     .run(ops, &signal, &mut |r: &BatchResult| if !r.is_success() { failures += 1 })
//!     .unwrap();
//! summary.log();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod list;
pub mod progress;

// Re-export commonly used types
pub use config::{BatchConfig, CliArgs, OutputFormat};
pub use core::{BatchResult, BatchSummary, Operation, WorkerPool};
pub use error::{BatchCopyError, Result};
pub use progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use batchcopy::prelude::*;
    //! ```

    pub use crate::config::{BatchConfig, OutputFormat};
    pub use crate::core::{
        cancel_channel, describe_batch, run_batch, BatchResult, BatchSummary, CancelHandle,
        CancelSignal, JsonSink, LogSink, OpContext, Operation, OperationKind, Outcome, PoolConfig,
        ResultSink, WorkerPool,
    };
    pub use crate::error::{BatchCopyError, Result};
    pub use crate::list::{load_list, parse_list};
    pub use crate::progress::{ProgressReporter, ProgressSink};
}
