//! Local file copy

use crate::core::Transport;
use crate::error::{BatchCopyError, IoResultExt, Result};
use crate::fs::{prepare_destination, probe_path, stream_to_file, PathKind};
use crate::progress::ProgressSink;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Copy one regular file to an absolute destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCopy {
    source: PathBuf,
    dest: PathBuf,
}

impl LocalCopy {
    /// Create a local copy from `source` to `dest`
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Source file path
    pub fn source(&self) -> &Path {
        &self.source
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
        match probe_path(&self.source)? {
            PathKind::Missing => return Err(BatchCopyError::NotFound(self.source.clone())),
            PathKind::Directory => return Err(BatchCopyError::IsDirectory(self.source.clone())),
            PathKind::File => {}
        }

        prepare_destination(&self.dest)?;

        let src_file = File::open(&self.source).with_path(&self.source)?;
        if let Some(sink) = progress.as_deref_mut() {
            let size = src_file.metadata().with_path(&self.source)?.len();
            sink.set_goal(size);
        }

        let mut reader = BufReader::with_capacity(transport.buffer_size(), src_file);
        stream_to_file(
            &mut reader,
            |e| BatchCopyError::io(&self.source, e),
            &self.dest,
            transport.buffer_size(),
            progress,
        )
    }
}
