//! Fixtures for exercising `RotatingLogFile` against a real directory.

use std::{fs, path::Path};

use rotalog::list_log_files;
use rstest::fixture;
use tempfile::TempDir;

/// Return a fresh temporary directory that is removed when dropped.
#[fixture]
pub fn log_dir() -> TempDir {
    tempfile::tempdir().expect("create temp log dir")
}

/// Read every `<prefix>-*.log` file in `dir`, oldest first.
pub fn read_back(dir: &Path, prefix: &str) -> Vec<String> {
    list_log_files(dir, prefix)
        .expect("list log files")
        .iter()
        .map(|path| fs::read_to_string(path).expect("read log file"))
        .collect()
}
