//! Storage backend used by the rotation engine.
//!
//! The engine never touches the filesystem directly; it goes through a
//! [`LogStore`]. [`DiskStore`] is the production implementation. Tests supply
//! in-memory or failing stores to drive the engine's error paths.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Operations the rotation engine needs from its storage.
///
/// Implementations are moved onto the engine thread and used from there
/// only.
pub trait LogStore: Send + 'static {
    /// Writer for one open log file.
    type Writer: Write + Send;

    /// Create and open the file at `path` for writing.
    fn open(&mut self, path: &Path) -> io::Result<Self::Writer>;

    /// Flush, persist and close a writer previously returned by [`open`].
    ///
    /// [`open`]: LogStore::open
    fn close(&mut self, writer: Self::Writer) -> io::Result<()>;

    /// Delete a file that has aged out of the retention window.
    fn remove(&mut self, path: &Path) -> io::Result<()>;
}

/// File permissions for newly created log files on Unix.
pub const LOG_FILE_MODE: u32 = 0o644;

/// [`LogStore`] writing buffered files to the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskStore;

impl LogStore for DiskStore {
    type Writer = BufWriter<File>;

    #[allow(
        clippy::suspicious_open_options,
        reason = "an existing file is never truncated"
    )]
    fn open(&mut self, path: &Path) -> io::Result<Self::Writer> {
        let mut options = OpenOptions::new();
        options.create(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(LOG_FILE_MODE);
        }
        let file = options
            .open(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
        Ok(BufWriter::new(file))
    }

    fn close(&mut self, mut writer: Self::Writer) -> io::Result<()> {
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    fn remove(&mut self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
