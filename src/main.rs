//! batchcopy CLI - parallel batch copy and download
//!
//! Reads a list file, then copies or downloads every entry with a fixed
//! number of workers.

use anyhow::Context;
use batchcopy::config::{BatchConfig, CliArgs, OutputFormat};
use batchcopy::core::{cancel_channel, describe_batch, JsonSink, LogSink, WorkerPool};
use batchcopy::list::load_list;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; stdout is reserved for JSON results
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: CliArgs) -> anyhow::Result<i32> {
    let config = BatchConfig::from_cli(&args).context("invalid configuration")?;

    if config.verbose {
        print_config(&config);
    }

    let operations = load_list(&config.list_file, &config.source_root, &config.dest_root)
        .with_context(|| format!("failed to load list '{}'", config.list_file.display()))?;

    if config.dry_run {
        info!("Would run {} operations with {} workers:", operations.len(), config.threads);
        for line in describe_batch(&operations) {
            info!("{}", line);
        }
        return Ok(0);
    }

    let (handle, signal) = cancel_channel();
    ctrlc::set_handler(move || {
        debug!("got interrupt signal");
        handle.cancel();
    })
    .context("failed to install interrupt handler")?;

    let pool = WorkerPool::new(config.pool_config());
    let summary = match config.output_format {
        OutputFormat::Text => pool.run(operations, &signal, &mut LogSink)?,
        OutputFormat::Json => {
            let mut sink = JsonSink::new(std::io::stdout());
            pool.run(operations, &signal, &mut sink)?
        }
    };

    summary.log();
    info!("Done");

    if config.strict && summary.failed > 0 {
        return Ok(2);
    }
    Ok(0)
}

fn print_config(config: &BatchConfig) {
    debug!("List:        {}", config.list_file.display());
    debug!("Source root: {}", config.source_root.display());
    debug!("Dest root:   {}", config.dest_root.display());
    debug!("Threads:     {}", config.threads);
    debug!(
        "Buffer:      {}",
        humansize::format_size(config.buffer_size as u64, humansize::BINARY)
    );
    debug!(
        "Progress:    every {}",
        humantime::format_duration(config.progress_interval)
    );
    debug!(
        "Timeout:     {}",
        humantime::format_duration(config.connect_timeout)
    );
    debug!("Output:      {:?}", config.output_format);
}
