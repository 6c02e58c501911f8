//! Builder for [`RotatingLogFile`].
//!
//! Provides a fluent API that validates the bounds before any thread is
//! spawned. The raw constructors on [`RotatingLogFile`] accept whatever they
//! are given; the builder is the place to reject nonsensical settings.

use std::{fs, io, path::PathBuf};

use thiserror::Error;

use crate::{config::LogFileConfig, handle::RotatingLogFile};

/// Errors that may occur while building a rotating log file.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid rotating log file configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst inspecting the target directory or
    /// reading a configuration file.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Malformed INI configuration.
    #[error("invalid INI configuration: {0}")]
    Ini(String),
}

/// Builder for constructing [`RotatingLogFile`] instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotatingLogFileBuilder {
    dir: PathBuf,
    prefix: String,
    config: LogFileConfig,
}

impl RotatingLogFileBuilder {
    /// Create a builder writing `<prefix>-*.log` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            config: LogFileConfig::default(),
        }
    }

    /// Set the maximum number of retained files.
    pub fn with_max_files(mut self, max_files: u32) -> Self {
        self.config.max_files = max_files;
        self
    }

    /// Set the maximum number of records per file.
    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.config.max_records = max_records;
        self
    }

    /// Set the bounded queue capacity. Zero makes every submission wait for
    /// the engine.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the periodic flush interval.
    pub fn with_flush_interval(mut self, interval: usize) -> Self {
        self.config.flush_interval = interval;
        self
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn config(&self) -> LogFileConfig {
        self.config
    }

    fn validate(&self) -> Result<(), BuildError> {
        for (field, value) in [
            ("max_files", u64::from(self.config.max_files)),
            ("max_records", u64::from(self.config.max_records)),
            ("flush_interval", self.config.flush_interval as u64),
        ] {
            if value == 0 {
                return Err(BuildError::InvalidConfig(format!(
                    "{field} must be greater than zero"
                )));
            }
        }
        if self.prefix.is_empty() {
            return Err(BuildError::InvalidConfig(
                "prefix must not be empty".to_string(),
            ));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(BuildError::InvalidConfig(format!(
                "prefix must not contain path separators: {:?}",
                self.prefix
            )));
        }
        if !fs::metadata(&self.dir)?.is_dir() {
            return Err(BuildError::InvalidConfig(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        Ok(())
    }

    /// Validate the configuration and start the rotating log file.
    pub fn build(&self) -> Result<RotatingLogFile, BuildError> {
        self.validate()?;
        Ok(RotatingLogFile::with_config(
            self.dir.clone(),
            self.prefix.clone(),
            self.config,
        ))
    }
}
