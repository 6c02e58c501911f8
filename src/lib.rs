//! Self-rotating, size-bounded log files.
//!
//! [`RotatingLogFile`] accepts raw byte records from any number of threads
//! and hands them to a single background engine that owns the files. The
//! engine writes records in submission order to
//! `<dir>/<prefix>-<unix microseconds>.log`, starts a new file once the
//! current one holds `max_records` records, and deletes the oldest file when
//! more than `max_files` exist.

mod builder;
mod config;
mod engine;
pub mod file_config;
mod handle;
mod naming;
pub mod rate_limited_warner;
mod store;
#[cfg(test)]
mod test_support;
#[cfg(feature = "tracing-compat")]
mod tracing_compat;

pub use builder::{BuildError, RotatingLogFileBuilder};
pub use config::{
    DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_FILES, DEFAULT_MAX_RECORDS, DEFAULT_QUEUE_CAPACITY,
    LogFileConfig,
};
pub use handle::{FLUSH_TIMEOUT, LogFileError, RotatingLogFile, SHUTDOWN_TIMEOUT};
pub use naming::{list_log_files, parse_timestamp};
pub use store::{DiskStore, LOG_FILE_MODE, LogStore};
