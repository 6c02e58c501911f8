//! Background rotation engine for [`RotatingLogFile`](crate::RotatingLogFile).
//!
//! The engine is the only code that touches log files. It receives
//! [`FileCommand`] values over a bounded channel, writes records to the
//! active file, rolls over to a fresh file once the per-file record cap is
//! reached, and deletes the oldest file once more than the configured number
//! of files exist. When the channel closes, or when an open or write fails,
//! the engine closes its active file and stops.
//!
//! [`RotationEngine::run`] executes the whole lifecycle on the calling thread
//! and reports how it ended. [`spawn_engine`] runs it on a dedicated thread
//! and signals completion over a one-shot channel.

use std::{
    collections::VecDeque,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Barrier},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, error, warn};

use crate::{config::LogFileConfig, naming::LogFileNamer, store::LogStore};

/// Commands sent to the engine thread.
#[derive(Debug)]
pub(crate) enum FileCommand {
    /// One record, already copied out of the caller's buffer.
    Record(Vec<u8>),
    /// Flush the active file and reply with the outcome.
    Flush(Sender<bool>),
}

/// Why the engine stopped.
#[derive(Debug)]
pub(crate) enum ExitReason {
    /// The record queue was closed and fully drained.
    QueueClosed,
    /// The first log file could not be opened; no record was consumed.
    OpenFailed(io::Error),
    /// A rollover failed. When the new file could not be opened the previous
    /// file stayed active until shutdown and is left on disk.
    RotationFailed(io::Error),
    /// Writing or flushing the active file failed.
    WriteFailed(io::Error),
}

/// Outcome of one engine lifecycle.
#[derive(Debug)]
pub(crate) struct EngineSummary {
    pub(crate) exit: ExitReason,
    pub(crate) records_written: u64,
    pub(crate) files_opened: u64,
}

/// Tracks how many writes occurred and triggers periodic flushes.
pub(crate) struct FlushTracker {
    writes: usize,
    flush_interval: usize,
}

impl FlushTracker {
    pub(crate) fn new(flush_interval: usize) -> Self {
        Self {
            writes: 0,
            flush_interval,
        }
    }

    pub(crate) fn record_write<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.writes += 1;
        self.flush_if_due(writer).map_err(|e| {
            warn!(
                "rotalog: flush error after write {}/{}: {e}",
                self.writes, self.flush_interval
            );
            e
        })
    }

    pub(crate) fn reset(&mut self) {
        self.writes = 0;
    }

    fn should_flush(&self) -> bool {
        self.flush_interval != 0
            && self.writes > 0
            && self.writes.is_multiple_of(self.flush_interval)
    }

    fn flush_if_due<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.should_flush() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Single owner of the active file, the line counter and the live-path list.
pub(crate) struct RotationEngine<S: LogStore> {
    store: S,
    namer: LogFileNamer,
    max_files: usize,
    max_records: u32,
    tracker: FlushTracker,
    active: Option<S::Writer>,
    line_count: u32,
    /// Oldest first. The back entry is the active file.
    live_paths: VecDeque<PathBuf>,
    records_written: u64,
    files_opened: u64,
}

impl<S: LogStore> RotationEngine<S> {
    pub(crate) fn new(
        store: S,
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        config: &LogFileConfig,
    ) -> Self {
        Self {
            store,
            namer: LogFileNamer::new(dir, prefix),
            max_files: config.effective_max_files(),
            max_records: config.effective_max_records(),
            tracker: FlushTracker::new(config.flush_interval),
            active: None,
            line_count: 0,
            live_paths: VecDeque::new(),
            records_written: 0,
            files_opened: 0,
        }
    }

    /// Run until `commands` closes or an I/O failure stops the engine.
    ///
    /// The active file is always closed before this returns, whichever way
    /// the engine stopped.
    pub(crate) fn run(mut self, commands: Receiver<FileCommand>) -> EngineSummary {
        let exit = self.process(commands);
        self.close_active();
        EngineSummary {
            exit,
            records_written: self.records_written,
            files_opened: self.files_opened,
        }
    }

    fn process(&mut self, commands: Receiver<FileCommand>) -> ExitReason {
        if let Err(e) = self.open_next_file() {
            error!("rotalog: failed to open initial log file: {e}");
            return ExitReason::OpenFailed(e);
        }
        for cmd in commands {
            match cmd {
                FileCommand::Record(record) => {
                    if self.line_count >= self.max_records {
                        if let Err(e) = self.open_next_file() {
                            error!("rotalog: rotation failed, stopping writer: {e}");
                            return ExitReason::RotationFailed(e);
                        }
                    }
                    if let Err(e) = self.write_record(&record) {
                        error!("rotalog: write error, stopping writer: {e}");
                        return ExitReason::WriteFailed(e);
                    }
                }
                FileCommand::Flush(reply) => {
                    let flushed = self.flush_active();
                    // The caller may have given up waiting; never block on the reply.
                    let _ = reply.try_send(flushed.is_ok());
                    if let Err(e) = flushed {
                        error!("rotalog: flush error, stopping writer: {e}");
                        return ExitReason::WriteFailed(e);
                    }
                }
            }
        }
        ExitReason::QueueClosed
    }

    /// Open a fresh file and make it the active one.
    ///
    /// The previous file is only closed once its replacement is open, so a
    /// failed open leaves the current file active.
    fn open_next_file(&mut self) -> io::Result<()> {
        let path = self.namer.next_path();
        let writer = self.store.open(&path)?;
        debug!("rotalog: opened {}", path.display());
        let previous = self.active.replace(writer);
        self.live_paths.push_back(path);
        self.line_count = 0;
        self.tracker.reset();
        self.files_opened += 1;
        let closed = match previous {
            Some(writer) => self.store.close(writer),
            None => Ok(()),
        };
        self.evict_expired();
        closed
    }

    fn evict_expired(&mut self) {
        while self.live_paths.len() > self.max_files {
            let Some(oldest) = self.live_paths.pop_front() else {
                break;
            };
            match self.store.remove(&oldest) {
                Ok(()) => debug!("rotalog: removed {}", oldest.display()),
                Err(e) => warn!("rotalog: failed to remove {}: {e}", oldest.display()),
            }
        }
    }

    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        let writer = self
            .active
            .as_mut()
            .ok_or_else(|| io::Error::other("no active log file"))?;
        writer.write_all(record)?;
        self.line_count += 1;
        self.records_written += 1;
        self.tracker.record_write(writer)
    }

    fn flush_active(&mut self) -> io::Result<()> {
        self.tracker.reset();
        match self.active.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close_active(&mut self) {
        if let Some(writer) = self.active.take() {
            if let Err(e) = self.store.close(writer) {
                error!("rotalog: failed to close active log file: {e}");
            }
        }
    }
}

/// Options applied when spawning the engine thread.
#[derive(Default)]
pub(crate) struct SpawnOptions {
    /// Holds the engine back before it opens its first file. Tests use it
    /// to observe queue backpressure deterministically.
    pub(crate) start_barrier: Option<Arc<Barrier>>,
}

/// Channels and thread handle connecting a handle to its engine.
pub(crate) struct EngineParts {
    pub(crate) tx: Sender<FileCommand>,
    pub(crate) done_rx: Receiver<()>,
    pub(crate) handle: JoinHandle<()>,
}

/// Spawn `engine` on its own thread behind a queue of `capacity` commands.
pub(crate) fn spawn_engine<S: LogStore>(
    engine: RotationEngine<S>,
    capacity: usize,
    options: SpawnOptions,
) -> EngineParts {
    let (tx, rx) = bounded(capacity);
    let (done_tx, done_rx) = bounded(1);
    let SpawnOptions { start_barrier } = options;
    let handle = thread::spawn(move || {
        if let Some(b) = start_barrier {
            b.wait();
        }
        let summary = engine.run(rx);
        debug!(
            "rotalog: engine stopped ({:?}) after {} records in {} files",
            summary.exit, summary.records_written, summary.files_opened
        );
        let _ = done_tx.send(());
    });
    EngineParts {
        tx,
        done_rx,
        handle,
    }
}
