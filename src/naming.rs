//! Log file naming.
//!
//! Files are named `<prefix>-<unix microseconds>.log` inside the target
//! directory. The timestamp orders files from oldest to newest, which is the
//! only on-disk ordering information the crate relies on.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Utc;

const EXTENSION: &str = ".log";

/// Generates timestamped paths for one rotation engine.
///
/// Timestamps handed out by a namer are strictly increasing. When the clock
/// yields a value at or below the previous one (two rotations inside the same
/// microsecond, or the clock stepping backwards) the previous value plus one
/// is used instead.
#[derive(Debug)]
pub(crate) struct LogFileNamer {
    dir: PathBuf,
    prefix: String,
    last_micros: Option<i64>,
}

impl LogFileNamer {
    pub(crate) fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            last_micros: None,
        }
    }

    /// Return the path for the next log file.
    pub(crate) fn next_path(&mut self) -> PathBuf {
        self.next_path_at(Utc::now().timestamp_micros())
    }

    pub(crate) fn next_path_at(&mut self, now_micros: i64) -> PathBuf {
        let micros = match self.last_micros {
            Some(last) if now_micros <= last => last + 1,
            _ => now_micros,
        };
        self.last_micros = Some(micros);
        self.dir.join(file_name(&self.prefix, micros))
    }
}

fn file_name(prefix: &str, micros: i64) -> String {
    format!("{prefix}-{micros}{EXTENSION}")
}

/// Extract the timestamp from a file name produced for `prefix`.
///
/// Returns `None` for names that do not follow the
/// `<prefix>-<unix microseconds>.log` scheme.
///
/// # Examples
///
/// ```
/// use rotalog::parse_timestamp;
///
/// assert_eq!(parse_timestamp("app-1700000000000000.log", "app"), Some(1_700_000_000_000_000));
/// assert_eq!(parse_timestamp("other-1.log", "app"), None);
/// ```
pub fn parse_timestamp(file_name: &str, prefix: &str) -> Option<i64> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// List log files written for `prefix` in `dir`, oldest first.
///
/// Entries that do not match the naming scheme are ignored, so the directory
/// may be shared with other files.
pub fn list_log_files(dir: impl AsRef<Path>, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(micros) = name.to_str().and_then(|name| parse_timestamp(name, prefix)) else {
            continue;
        };
        found.push((micros, entry.path()));
    }
    found.sort_by_key(|(micros, _)| *micros);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
