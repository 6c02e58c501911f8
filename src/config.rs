//! Configuration for [`RotatingLogFile`](crate::RotatingLogFile).
//!
//! [`LogFileConfig`] groups the three bounds that govern rotation and
//! retention together with the flush cadence of the background writer. The
//! values are fixed once the handle is constructed; the rotation engine reads
//! its own copy and nothing can change them afterwards.

use serde::{Deserialize, Serialize};

/// Default number of log files retained on disk.
pub const DEFAULT_MAX_FILES: u32 = 10;
/// Default number of records written to one file before rolling over.
pub const DEFAULT_MAX_RECORDS: u32 = 16 * 1024;
/// Default bounded queue size between callers and the rotation engine.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;
/// Default flush interval: flush the active file after every record.
pub const DEFAULT_FLUSH_INTERVAL: usize = 1;

/// Bounds applied by the rotation engine.
///
/// The raw constructors accept these values as given. A `queue_capacity` of
/// zero turns every submission into a rendezvous with the engine. A
/// `max_records` or `max_files` of zero is applied as one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    /// Maximum number of log files kept on disk, the active file included.
    pub max_files: u32,
    /// Maximum number of records written to a single file.
    pub max_records: u32,
    /// Capacity of the record queue feeding the engine.
    pub queue_capacity: usize,
    /// Number of records written between flushes of the buffered writer.
    ///
    /// Zero disables periodic flushing; the file is still flushed on
    /// rotation, on explicit flush requests, and on shutdown.
    pub flush_interval: usize,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_records: DEFAULT_MAX_RECORDS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl LogFileConfig {
    /// Set the maximum number of retained files.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotalog::LogFileConfig;
    ///
    /// let config = LogFileConfig::default().with_max_files(3);
    /// assert_eq!(config.max_files, 3);
    /// ```
    pub const fn with_max_files(mut self, max_files: u32) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the maximum number of records per file.
    pub const fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = max_records;
        self
    }

    /// Set the record queue capacity.
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set how many records are written between flushes.
    pub const fn with_flush_interval(mut self, flush_interval: usize) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Per-file cap as applied by the engine.
    pub(crate) fn effective_max_records(&self) -> u32 {
        self.max_records.max(1)
    }

    /// Retention cap as applied by the engine.
    pub(crate) fn effective_max_files(&self) -> usize {
        self.max_files.max(1) as usize
    }
}
