//! Shared helpers for unit tests.
//!
//! Provides a capturing logger so tests can assert emitted log messages
//! without conflicting with the global logger state, and an in-memory
//! [`LogStore`] whose opens, writes and deletions can be made to fail.

use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, Once, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::store::LogStore;

#[derive(Clone, Debug)]
pub(crate) struct CapturedLog {
    pub level: Level,
    pub message: String,
}

struct TestLogger;

static LOGGER: TestLogger = TestLogger;
static INIT: Once = Once::new();
static LOGS: OnceLock<Mutex<Vec<CapturedLog>>> = OnceLock::new();

impl Log for TestLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let logs = LOGS.get_or_init(|| Mutex::new(Vec::new()));
            let mut guard = logs.lock().expect("logger mutex poisoned");
            guard.push(CapturedLog {
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

pub(crate) fn install_test_logger() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("set test logger");
        log::set_max_level(LevelFilter::Trace);
    });
    clear_logs();
}

pub(crate) fn take_logged_messages() -> Vec<CapturedLog> {
    let logs = LOGS.get_or_init(|| Mutex::new(Vec::new()));
    let mut guard = logs.lock().expect("logger mutex poisoned");
    guard.drain(..).collect()
}

pub(crate) fn clear_logs() {
    if let Some(logs) = LOGS.get() {
        logs.lock().expect("logger mutex poisoned").clear();
    }
}

/// Whether any captured message at `level` contains `needle`.
pub(crate) fn logged(logs: &[CapturedLog], level: Level, needle: &str) -> bool {
    logs.iter()
        .any(|log| log.level == level && log.message.contains(needle))
}

/// Observable state of a [`MemoryStore`].
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    /// Flushed contents of every file still present.
    pub files: BTreeMap<PathBuf, Vec<u8>>,
    pub opened: Vec<PathBuf>,
    pub closed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl StoreState {
    /// Paths still present, in the order they were opened.
    pub fn live_files(&self) -> Vec<PathBuf> {
        self.opened
            .iter()
            .filter(|path| self.files.contains_key(*path))
            .cloned()
            .collect()
    }

    pub fn contents(&self, path: &Path) -> String {
        String::from_utf8(self.files.get(path).cloned().unwrap_or_default())
            .expect("invalid UTF-8")
    }
}

/// In-memory [`LogStore`] with fault injection.
///
/// Bytes written to a [`MemoryWriter`] only become visible in
/// [`StoreState::files`] once the writer is flushed or closed.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    /// Fail the open call with this 1-based index.
    fail_open_on: Option<usize>,
    /// Fail every write after this many successful ones.
    fail_writes_after: Option<usize>,
    /// Fail the close call with this 1-based index, leaving the file as is.
    fail_close_on: Option<usize>,
    fail_remove: bool,
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub(crate) fn failing_open_on(mut self, call: usize) -> Self {
        self.fail_open_on = Some(call);
        self
    }

    pub(crate) fn failing_writes_after(mut self, writes: usize) -> Self {
        self.fail_writes_after = Some(writes);
        self
    }

    pub(crate) fn failing_close_on(mut self, call: usize) -> Self {
        self.fail_close_on = Some(call);
        self
    }

    pub(crate) fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }
}

impl LogStore for MemoryStore {
    type Writer = MemoryWriter;

    fn open(&mut self, path: &Path) -> io::Result<Self::Writer> {
        let call = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_open_on == Some(call) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("simulated open failure for {}", path.display()),
            ));
        }
        let mut state = self.state();
        state.files.insert(path.to_path_buf(), Vec::new());
        state.opened.push(path.to_path_buf());
        Ok(MemoryWriter {
            path: path.to_path_buf(),
            pending: Vec::new(),
            state: Arc::clone(&self.state),
            writes: Arc::clone(&self.writes),
            fail_writes_after: self.fail_writes_after,
        })
    }

    fn close(&mut self, mut writer: Self::Writer) -> io::Result<()> {
        let call = self.closes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_close_on == Some(call) {
            return Err(io::Error::other(format!(
                "simulated close failure for {}",
                writer.path.display()
            )));
        }
        writer.flush()?;
        self.state().closed.push(writer.path.clone());
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> io::Result<()> {
        if self.fail_remove {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated remove failure",
            ));
        }
        let mut state = self.state();
        state.files.remove(path);
        state.removed.push(path.to_path_buf());
        Ok(())
    }
}

pub(crate) struct MemoryWriter {
    path: PathBuf,
    pending: Vec<u8>,
    state: Arc<Mutex<StoreState>>,
    writes: Arc<AtomicUsize>,
    fail_writes_after: Option<usize>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let done = self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes_after.is_some_and(|limit| done >= limit) {
            return Err(io::Error::other("simulated write failure"));
        }
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if let Some(file) = state.files.get_mut(&self.path) {
            file.append(&mut self.pending);
        } else {
            // Removed while open: the bytes go nowhere, as with an unlinked file.
            self.pending.clear();
        }
        Ok(())
    }
}
