//! Error types for BatchCopy
//!
//! Errors fall into two groups: pre-flight errors that stop the process
//! before any worker starts, and per-operation errors that are captured in a
//! single operation's result and never leave the worker that produced them.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for BatchCopy operations
#[derive(Error, Debug)]
pub enum BatchCopyError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file does not exist
    #[error("does not exist: '{0}'")]
    NotFound(PathBuf),

    /// Source path is a directory, not a file
    #[error("is a directory, not a file: '{0}'")]
    IsDirectory(PathBuf),

    /// Destination path already exists as a directory
    #[error("destination exists as a directory: '{0}'")]
    DestIsDirectory(PathBuf),

    /// Server answered with something other than 200 OK
    #[error("HTTP status {status} for '{url}'")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Request could not be sent or the body could not be read
    #[error("HTTP request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connection failed while the response body was streaming
    #[error("reading body of '{url}' failed: {source}")]
    HttpBody {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// A list line looked like a URL but did not parse, or its path does
    /// not map onto a destination file
    #[error("line {line}: invalid URL '{url}': {source}")]
    InvalidUrl {
        line: usize,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The list file could not be read
    #[error("unable to read list file '{path}': {source}")]
    ListFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An operation was asked to run a second time
    #[error("operation for '{0}' was already executed")]
    AlreadyExecuted(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Worker threads could not be started
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl BatchCopyError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// True for errors that abort the batch before any worker starts
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. }
                | Self::ListFile { .. }
                | Self::ConfigError(_)
                | Self::ThreadPoolError(_)
        )
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::NotFound(path)
            | Self::IsDirectory(path)
            | Self::DestIsDirectory(path)
            | Self::ListFile { path, .. }
            | Self::AlreadyExecuted(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for BatchCopy operations
pub type Result<T> = std::result::Result<T, BatchCopyError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| BatchCopyError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = BatchCopyError::io("/test/path", io_err);
        assert_eq!(err.path(), Some(&PathBuf::from("/test/path")));
        assert!(!err.is_preflight());
    }

    #[test]
    fn test_with_path_extension() {
        let res: std::io::Result<()> = Err(std::io::Error::other("boom"));
        let err = res.with_path("/dst/a.txt").unwrap_err();
        assert!(err.to_string().contains("/dst/a.txt"));
    }

    #[test]
    fn test_preflight_classification() {
        let parse_err = url::Url::parse("http://[::1").unwrap_err();
        let invalid = BatchCopyError::InvalidUrl {
            line: 3,
            url: "http://[::1".to_string(),
            source: parse_err.into(),
        };
        assert!(invalid.is_preflight());
        assert!(invalid.to_string().starts_with("line 3"));

        assert!(BatchCopyError::config("threads must be at least 1").is_preflight());
        assert!(!BatchCopyError::NotFound(PathBuf::from("/src/a")).is_preflight());
        assert!(!BatchCopyError::DestIsDirectory(PathBuf::from("/dst/a")).is_preflight());
    }

    #[test]
    fn test_http_status_message() {
        let err = BatchCopyError::HttpStatus {
            url: "https://example.com/b.bin".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(
            err.to_string(),
            "HTTP status 404 Not Found for 'https://example.com/b.bin'"
        );
        assert!(err.path().is_none());
    }
}
