//! File operations shared by the transfer variants
//!
//! Path probing, destination preparation, and the streaming copy loop that
//! feeds a progress sink with every chunk written.

use crate::error::{BatchCopyError, IoResultExt, Result};
use crate::progress::ProgressSink;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Default buffer size for streamed copies
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// What exists at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Nothing there
    Missing,
    /// A file (or anything that is not a directory)
    File,
    /// A directory
    Directory,
}

/// Look at a path without following up on errors other than "not found"
pub fn probe_path(path: &Path) -> Result<PathKind> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(PathKind::Directory),
        Ok(_) => Ok(PathKind::File),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(PathKind::Missing),
        Err(e) => Err(BatchCopyError::io(path, e)),
    }
}

/// Create the parent directories of `dest` and make sure `dest` itself is
/// not an existing directory.
pub fn prepare_destination(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).with_path(parent)?;
    }

    if probe_path(dest)? == PathKind::Directory {
        return Err(BatchCopyError::DestIsDirectory(dest.to_path_buf()));
    }

    Ok(())
}

/// Stream `reader` into a newly created `dest` file, reporting every chunk
///
/// Returns the number of bytes written. The destination is flushed and
/// synced before returning. Read errors go through `read_error`, since only
/// the caller knows what the reader is attached to.
pub fn stream_to_file<R, E>(
    reader: &mut R,
    read_error: E,
    dest: &Path,
    buffer_size: usize,
    mut progress: Option<&mut (dyn ProgressSink + '_)>,
) -> Result<u64>
where
    R: Read,
    E: Fn(std::io::Error) -> BatchCopyError,
{
    let dst_file = File::create(dest).with_path(dest)?;
    let mut writer = BufWriter::with_capacity(buffer_size, dst_file);

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut bytes_copied = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };

        writer
            .write_all(&buffer[..bytes_read])
            .with_path(dest)?;

        bytes_copied += bytes_read as u64;
        if let Some(sink) = progress.as_deref_mut() {
            sink.advance(bytes_read as u64);
        }
    }

    writer.flush().with_path(dest)?;
    let file = writer
        .into_inner()
        .map_err(|e| BatchCopyError::io(dest, e.into_error()))?;
    file.sync_all().with_path(dest)?;

    Ok(bytes_copied)
}
