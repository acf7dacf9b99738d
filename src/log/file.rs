//! Active log file
//!
//! Exclusive owner of the open log handle and its append offset.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The single append-only log file of an engine
///
/// `position` always equals the length of the file: every append starts there
/// and advances it by the number of bytes written.
pub struct ActiveLog {
    path: PathBuf,
    file: File,
    position: u64,
}

impl ActiveLog {
    /// Open `path` for read + append. Fails with `NotFound` if the file is
    /// missing and `create` is false.
    pub fn open_file(path: &Path, create: bool) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(create)
            .open(path)?;
        Ok(file)
    }

    /// Wrap an already-replayed file whose valid content ends at `position`.
    pub fn new(path: &Path, file: File, position: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            file,
            position,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current append offset (the log's length)
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Append `bytes` and fsync. Returns the offset the bytes were written at.
    ///
    /// The start offset is taken from the real end of the file on every call,
    /// so bytes left behind by an earlier failed append cannot skew it. On
    /// failure nothing is rolled back.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let start = self.file.seek(SeekFrom::End(0))?;
        if start != self.position {
            tracing::warn!(
                path = %self.path.display(),
                tracked = self.position,
                actual = start,
                "log length differs from tracked position"
            );
            self.position = start;
        }

        let written = self
            .file
            .write_all(bytes)
            .and_then(|_| self.file.sync_all());

        if let Err(e) = written {
            tracing::warn!(
                path = %self.path.display(),
                offset = start,
                error = %e,
                "append to log failed"
            );
            return Err(e.into());
        }

        self.position = start + bytes.len() as u64;
        Ok(start)
    }

    /// Read exactly `len` bytes at `offset`. A short read is an I/O error.
    pub fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Sync and release the handle.
    pub fn close(mut self) -> Result<()> {
        self.sync()?;
        drop(self.file);
        Ok(())
    }
}
