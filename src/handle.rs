//! Public handle for the rotating log file.
//!
//! `RotatingLogFile` spawns a dedicated engine thread that owns every file it
//! writes. Callers submit records through a bounded queue and never touch the
//! filesystem themselves: a submission returns as soon as the record is
//! queued, and any I/O failure is handled on the engine thread.
//!
//! Construct the handle with [`RotatingLogFile::new`] for defaults,
//! [`RotatingLogFile::with_config`] to tune the bounds, or
//! [`RotatingLogFile::with_store`] to write through a custom [`LogStore`].
//! Call [`RotatingLogFile::close`] exactly once to drain the queue and close
//! the active file; dropping the handle closes it as well.

use std::{
    io::{self, Write},
    path::PathBuf,
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::warn;
use thiserror::Error;

use crate::{
    config::LogFileConfig,
    engine::{FileCommand, RotationEngine, SpawnOptions, spawn_engine},
    rate_limited_warner::RateLimitedWarner,
    store::{DiskStore, LogStore},
};

/// How long [`RotatingLogFile::close`] waits for the engine to finish.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);
/// How long [`RotatingLogFile::flush`] waits for the engine to acknowledge.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors reported by [`RotatingLogFile`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LogFileError {
    /// The handle has already been closed.
    #[error("rotating log file is closed")]
    Closed,
    /// The engine did not acknowledge shutdown in time. It keeps draining
    /// and closes its file in the background.
    #[error("close rotation engine timed out after {0:?}; engine left to finish in background")]
    ShutdownTimeout(Duration),
    /// The engine thread panicked before acknowledging shutdown.
    #[error("rotation engine thread panicked")]
    EnginePanicked,
}

impl From<LogFileError> for io::Error {
    fn from(err: LogFileError) -> Self {
        let kind = match err {
            LogFileError::Closed => io::ErrorKind::BrokenPipe,
            LogFileError::ShutdownTimeout(_) => io::ErrorKind::TimedOut,
            LogFileError::EnginePanicked => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Self-rotating log sink writing raw records to timestamped files.
///
/// Records are written verbatim, in submission order, to
/// `<dir>/<prefix>-<unix microseconds>.log`. Once a file holds
/// `max_records` records the next record starts a new file, and once more
/// than `max_files` files exist the oldest is deleted.
///
/// ```no_run
/// use rotalog::{LogFileConfig, RotatingLogFile};
///
/// let mut log = RotatingLogFile::with_config(
///     "/var/log/app",
///     "app",
///     LogFileConfig::default().with_max_files(3).with_max_records(64),
/// );
/// log.submit(b"started\n")?;
/// log.close()?;
/// # Ok::<(), rotalog::LogFileError>(())
/// ```
pub struct RotatingLogFile {
    tx: Option<Sender<FileCommand>>,
    handle: Option<JoinHandle<()>>,
    done_rx: Receiver<()>,
    dropped: RateLimitedWarner,
}

impl RotatingLogFile {
    /// Create a log file sink in `dir` with default bounds.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self::with_config(dir, prefix, LogFileConfig::default())
    }

    /// Create a log file sink in `dir` with explicit bounds.
    ///
    /// Returns without waiting for the first file to be created. If `dir`
    /// is missing or not writable the engine stops immediately; records
    /// submitted afterwards are discarded.
    pub fn with_config(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        config: LogFileConfig,
    ) -> Self {
        Self::with_store(dir, prefix, config, DiskStore)
    }

    /// Create a sink writing through `store` instead of the local disk.
    pub fn with_store<S: LogStore>(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        config: LogFileConfig,
        store: S,
    ) -> Self {
        Self::build_from_engine(dir, prefix, config, store, SpawnOptions::default())
    }

    pub(crate) fn build_from_engine<S: LogStore>(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        config: LogFileConfig,
        store: S,
        options: SpawnOptions,
    ) -> Self {
        let engine = RotationEngine::new(store, dir, prefix, &config);
        let parts = spawn_engine(engine, config.queue_capacity, options);
        Self {
            tx: Some(parts.tx),
            handle: Some(parts.handle),
            done_rx: parts.done_rx,
            dropped: RateLimitedWarner::default(),
        }
    }

    /// Queue a copy of `record` for writing and return its length.
    ///
    /// Blocks while the queue is full. The caller may reuse `record` as soon
    /// as this returns. Write failures on the engine thread are never
    /// reported here: once the engine has stopped, records are discarded
    /// with a rate-limited warning and this still returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`LogFileError::Closed`] when called after [`close`]. That is
    /// a caller bug; the record is not written.
    ///
    /// [`close`]: RotatingLogFile::close
    pub fn submit(&self, record: &[u8]) -> Result<usize, LogFileError> {
        let Some(tx) = &self.tx else {
            warn!("rotalog: submit called after close");
            return Err(LogFileError::Closed);
        };
        if tx.send(FileCommand::Record(record.to_vec())).is_err() {
            self.dropped.record_drop();
            self.dropped.warn_if_due(|count| {
                warn!("rotalog: {count} records dropped because the rotation engine has stopped");
            });
        }
        Ok(record.len())
    }

    /// Flush queued records to the active file without closing it.
    ///
    /// Returns `true` when the engine acknowledges the flush within
    /// [`FLUSH_TIMEOUT`]; `false` after [`close`], when the engine has
    /// stopped, or when the flush failed or timed out.
    ///
    /// [`close`]: RotatingLogFile::close
    pub fn flush(&self) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let (reply_tx, reply_rx) = bounded(1);
        if tx.send(FileCommand::Flush(reply_tx)).is_err() {
            return false;
        }
        reply_rx.recv_timeout(FLUSH_TIMEOUT).unwrap_or(false)
    }

    /// Close the queue and wait up to [`SHUTDOWN_TIMEOUT`] for the engine to
    /// drain it and close the active file.
    ///
    /// # Errors
    ///
    /// - [`LogFileError::ShutdownTimeout`] if the engine has not finished in
    ///   time. The engine keeps running detached until it has written every
    ///   queued record and closed its file.
    /// - [`LogFileError::EnginePanicked`] if the engine thread panicked.
    /// - [`LogFileError::Closed`] if the handle was already closed.
    pub fn close(&mut self) -> Result<(), LogFileError> {
        let Some(tx) = self.tx.take() else {
            return Err(LogFileError::Closed);
        };
        drop(tx);
        self.dropped.flush(|count| {
            warn!("rotalog: {count} records dropped because the rotation engine has stopped");
        });
        match self.done_rx.recv_timeout(SHUTDOWN_TIMEOUT) {
            // A disconnect without a message means the engine thread died;
            // the join below reports it.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => {
                self.handle.take();
                warn!("rotalog: rotation engine did not shut down within {SHUTDOWN_TIMEOUT:?}");
                return Err(LogFileError::ShutdownTimeout(SHUTDOWN_TIMEOUT));
            }
        }
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| {
                warn!("rotalog: rotation engine thread panicked");
                LogFileError::EnginePanicked
            }),
            None => Ok(()),
        }
    }

    /// Whether [`close`](RotatingLogFile::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}

impl Write for &RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        if RotatingLogFile::flush(self) {
            Ok(())
        } else {
            Err(io::Error::other("rotation engine did not acknowledge flush"))
        }
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }
}

impl Drop for RotatingLogFile {
    fn drop(&mut self) {
        if self.tx.is_some() {
            if let Err(e) = self.close() {
                warn!("rotalog: error closing log file on drop: {e}");
            }
        }
    }
}
