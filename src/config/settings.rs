//! Configuration settings for batchcopy
//!
//! Defines the CLI arguments and the validated runtime configuration
//! derived from them.

use crate::core::PoolConfig;
use crate::error::{BatchCopyError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// batchcopy - copy and download a list of files with a bounded worker pool
#[derive(Parser, Debug, Clone)]
#[command(name = "batchcopy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy local files and download URLs listed in a file, in parallel")]
#[command(long_about = r#"
batchcopy reads a list file with one entry per line and executes every
entry with a fixed number of worker threads.

List format:
  # comment            lines starting with '#' are ignored
  relative/path.txt    copied from <SRC>/relative/path.txt to <DEST>/relative/path.txt
  https://host/a/b     downloaded to <DEST>/a/b

Examples:
  batchcopy files.txt --src /data --dest /backup
  batchcopy files.txt --dest ./mirror -t 8 --progress-interval 5s
  batchcopy files.txt --dry-run
"#)]
pub struct CliArgs {
    /// File listing the operations, one per line
    #[arg(value_name = "LIST_FILE")]
    pub list_file: PathBuf,

    /// Root that relative source paths are resolved against (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Root that destinations are placed under (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 't', long, default_value = "1", value_name = "NUM")]
    pub threads: usize,

    /// Print what would be done without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Minimum time between progress lines of one transfer (e.g. 500ms, 2s)
    #[arg(long, default_value = "1s", value_name = "DURATION")]
    pub progress_interval: String,

    /// Buffer size for streamed copies (e.g. 64K, 1M)
    #[arg(long, default_value = "64K", value_name = "SIZE")]
    pub buffer_size: String,

    /// HTTP connect timeout (e.g. 10s)
    #[arg(long, default_value = "30s", value_name = "DURATION")]
    pub connect_timeout: String,

    /// How per-operation results are reported
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Exit with status 2 when any operation failed
    #[arg(long)]
    pub strict: bool,
}

/// Output format for per-operation results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Log lines
    #[default]
    Text,
    /// One JSON object per line on stdout
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// List file path
    pub list_file: PathBuf,
    /// Absolute source root
    pub source_root: PathBuf,
    /// Absolute destination root
    pub dest_root: PathBuf,
    /// Worker count
    pub threads: usize,
    /// Dry run mode
    pub dry_run: bool,
    /// Debug logging
    pub verbose: bool,
    /// Progress throttle
    pub progress_interval: Duration,
    /// Buffer size in bytes
    pub buffer_size: usize,
    /// HTTP connect timeout
    pub connect_timeout: Duration,
    /// Result output format
    pub output_format: OutputFormat,
    /// Nonzero exit on failed operations
    pub strict: bool,
}

impl BatchConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        if args.threads == 0 {
            return Err(BatchCopyError::config("thread count must be at least 1"));
        }

        let buffer_size = parse_size(&args.buffer_size)
            .map_err(|e| BatchCopyError::config(format!("invalid buffer size: {}", e)))?;
        if buffer_size == 0 {
            return Err(BatchCopyError::config("buffer size must be greater than zero"));
        }

        Ok(Self {
            list_file: args.list_file.clone(),
            source_root: absolute_root(args.src.as_deref())?,
            dest_root: absolute_root(args.dest.as_deref())?,
            threads: args.threads,
            dry_run: args.dry_run,
            verbose: args.verbose,
            progress_interval: parse_duration("progress interval", &args.progress_interval)?,
            buffer_size: buffer_size as usize,
            connect_timeout: parse_duration("connect timeout", &args.connect_timeout)?,
            output_format: args.output_format,
            strict: args.strict,
        })
    }

    /// Settings for the worker pool
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.threads,
            progress_interval: self.progress_interval,
            buffer_size: self.buffer_size,
            connect_timeout: self.connect_timeout,
        }
    }
}

fn absolute_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = root.unwrap_or_else(|| Path::new("."));
    std::path::absolute(root).map_err(|e| {
        BatchCopyError::config(format!("cannot resolve '{}': {}", root.display(), e))
    })
}

fn parse_duration(what: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| BatchCopyError::config(format!("invalid {} '{}': {}", what, value, e)))
}

/// Parse size string (e.g., "1G", "100M", "64K")
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("TB") || size.ends_with('T') {
        (size.trim_end_matches(['T', 'B']), 1024u64 * 1024 * 1024 * 1024)
    } else if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else {
        (size.trim_end_matches('B'), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;
    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid number: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}
