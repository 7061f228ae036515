//! The unit of work: one local copy or one HTTP download
//!
//! An `Operation` is built once from a list line, handed to exactly one
//! worker, executed at most once, and then reported through its result.

use crate::core::{HttpDownload, LocalCopy};
use crate::error::{BatchCopyError, Result};
use crate::fs::DEFAULT_BUFFER_SIZE;
use crate::progress::ProgressSink;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where an operation came from, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpContext {
    /// List file the operation was read from
    pub origin_file: String,
    /// 1-based line number in that file
    pub origin_line: usize,
}

impl OpContext {
    /// Create a context for a list line
    pub fn new(origin_file: impl Into<String>, origin_line: usize) -> Self {
        Self {
            origin_file: origin_file.into(),
            origin_line,
        }
    }
}

/// The two kinds of transfer
#[derive(Debug, Clone)]
pub enum OperationKind {
    /// Copy a file from the local source root
    LocalCopy(LocalCopy),
    /// Download a URL
    HttpDownload(HttpDownload),
}

/// Per-worker resources used while executing operations
pub struct Transport {
    client: reqwest::blocking::Client,
    buffer_size: usize,
}

impl Transport {
    /// Build a transport with the given copy buffer size and connect timeout
    pub fn new(buffer_size: usize, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("batchcopy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BatchCopyError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            buffer_size: buffer_size.max(1),
        })
    }

    /// HTTP client for downloads
    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }

    /// Buffer size for streamed copies
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// A single file transfer
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    context: OpContext,
    bytes_written: u64,
    executed: bool,
}

impl Operation {
    /// Create an operation from its kind and origin
    pub fn new(kind: OperationKind, context: OpContext) -> Self {
        Self {
            kind,
            context,
            bytes_written: 0,
            executed: false,
        }
    }

    /// Local copy from `source` to `dest`
    pub fn local(source: impl Into<PathBuf>, dest: impl Into<PathBuf>, context: OpContext) -> Self {
        Self::new(OperationKind::LocalCopy(LocalCopy::new(source, dest)), context)
    }

    /// Download of `url` into `dest`
    pub fn download(url: url::Url, dest: impl Into<PathBuf>, context: OpContext) -> Self {
        Self::new(OperationKind::HttpDownload(HttpDownload::new(url, dest)), context)
    }

    /// Which variant this is
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Destination path
    pub fn dest(&self) -> &Path {
        match &self.kind {
            OperationKind::LocalCopy(op) => op.dest(),
            OperationKind::HttpDownload(op) => op.dest(),
        }
    }

    /// Diagnostic origin
    pub fn context(&self) -> &OpContext {
        &self.context
    }

    /// Bytes written by the completed copy, 0 before that
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Whether `copy` has been called
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Describe what `copy` would do without doing it
    pub fn display_intent(&self) -> String {
        match &self.kind {
            OperationKind::LocalCopy(op) => format!(
                "Copy from \"{}\" to \"{}\"",
                op.source().display(),
                op.dest().display()
            ),
            OperationKind::HttpDownload(op) => format!(
                "Download from \"{}\" to \"{}\"",
                op.url(),
                op.dest().display()
            ),
        }
    }

    /// Run the transfer
    ///
    /// May be called once; a second call fails with `AlreadyExecuted`
    /// without touching the filesystem. On failure `bytes_written` still
    /// records whatever reached the destination.
    pub fn copy(
        &mut self,
        transport: &Transport,
        mut progress: Option<&mut (dyn ProgressSink + '_)>,
    ) -> Result<u64> {
        if self.executed {
            return Err(BatchCopyError::AlreadyExecuted(self.dest().to_path_buf()));
        }
        self.executed = true;

        let result = match &self.kind {
            OperationKind::LocalCopy(op) => op.copy(transport, progress.as_deref_mut()),
            OperationKind::HttpDownload(op) => op.copy(transport, progress.as_deref_mut()),
        };

        self.bytes_written = match (&result, progress.as_deref()) {
            (Ok(bytes), _) => *bytes,
            (Err(_), Some(sink)) => sink.bytes_written(),
            (Err(_), None) => 0,
        };

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display_intent() {
        let local = Operation::local("/src/a.txt", "/dst/a.txt", OpContext::new("list.txt", 1));
        assert_eq!(local.display_intent(), "Copy from \"/src/a.txt\" to \"/dst/a.txt\"");

        let url = url::Url::parse("https://example.com/b.bin").unwrap();
        let download = Operation::download(url, "/dst/b.bin", OpContext::new("list.txt", 4));
        assert_eq!(
            download.display_intent(),
            "Download from \"https://example.com/b.bin\" to \"/dst/b.bin\""
        );
        assert_eq!(download.dest(), Path::new("/dst/b.bin"));
        assert_eq!(download.context().origin_line, 4);
    }

    #[test]
    fn test_copy_runs_at_most_once() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.txt"), b"hello").unwrap();

        let mut op = Operation::local(
            src.path().join("a.txt"),
            dst.path().join("a.txt"),
            OpContext::new("list.txt", 1),
        );
        let transport = Transport::default();

        assert_eq!(op.copy(&transport, None).unwrap(), 5);
        assert_eq!(op.bytes_written(), 5);

        let err = op.copy(&transport, None).unwrap_err();
        assert!(matches!(err, BatchCopyError::AlreadyExecuted(_)));
        assert_eq!(op.bytes_written(), 5);
    }

    #[test]
    fn test_bytes_written_zero_before_copy() {
        let op = Operation::local("/src/a", "/dst/a", OpContext::default());
        assert_eq!(op.bytes_written(), 0);
        assert!(!op.is_executed());
    }
}
