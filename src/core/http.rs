//! HTTP download

use crate::core::Transport;
use crate::error::{BatchCopyError, Result};
use crate::fs::{prepare_destination, stream_to_file};
use crate::progress::ProgressSink;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use url::Url;

/// Download one URL to an absolute destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDownload {
    url: Url,
    dest: PathBuf,
}

impl HttpDownload {
    /// Create a download of `url` into `dest`
    pub fn new(url: Url, dest: impl Into<PathBuf>) -> Self {
        Self {
            url,
            dest: dest.into(),
        }
    }

    /// Source URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Destination file path
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub(crate) fn copy(
        &self,
        transport: &Transport,
        mut progress: Option<&mut (dyn ProgressSink + '_)>,
    ) -> Result<u64> {
        prepare_destination(&self.dest)?;

        let mut response = transport
            .client()
            .get(self.url.clone())
            .send()
            .map_err(|e| BatchCopyError::Http {
                url: self.url.to_string(),
                source: e,
            })?;

        // Checked before the destination is created, so a bad status leaves no file
        if response.status() != StatusCode::OK {
            return Err(BatchCopyError::HttpStatus {
                url: self.url.to_string(),
                status: response.status(),
            });
        }

        if let (Some(sink), Some(length)) = (progress.as_deref_mut(), response.content_length()) {
            sink.set_goal(length);
        }

        stream_to_file(
            &mut response,
            |e| BatchCopyError::HttpBody {
                url: self.url.to_string(),
                source: e,
            },
            &self.dest,
            transport.buffer_size(),
            progress,
        )
    }
}
