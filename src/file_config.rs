//! INI configuration for rotating log files.
//!
//! A section describes one sink:
//!
//! ```ini
//! [rotalog]
//! directory = /var/log/app
//! prefix = app
//! max_files = 3
//! max_records = 64
//! ```
//!
//! `directory` and `prefix` are required. The numeric keys fall back to
//! the [`LogFileConfig`](crate::LogFileConfig) defaults when absent.
//! Unknown keys are rejected.

use std::{fs, io::ErrorKind, path::Path, str::FromStr};

use ini::{Ini, Properties};

use crate::builder::{BuildError, RotatingLogFileBuilder};

const KNOWN_KEYS: [&str; 6] = [
    "directory",
    "prefix",
    "max_files",
    "max_records",
    "queue_capacity",
    "flush_interval",
];

/// Read `path` and build a [`RotatingLogFileBuilder`] from `section`.
///
/// # Errors
///
/// Returns [`BuildError::Io`] when the file cannot be read and
/// [`BuildError::Ini`] when it is empty, malformed, or the section is
/// missing or invalid.
pub fn load_ini(
    path: impl AsRef<Path>,
    section: &str,
) -> Result<RotatingLogFileBuilder, BuildError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => std::io::Error::new(
            ErrorKind::NotFound,
            format!("{} doesn't exist", path.display()),
        ),
        _ => err,
    })?;
    if text.trim().is_empty() {
        return Err(BuildError::Ini(format!("{} is an empty file", path.display())));
    }
    parse_ini(&text, section)
}

/// Parse INI `text` and build a [`RotatingLogFileBuilder`] from `section`.
pub fn parse_ini(text: &str, section: &str) -> Result<RotatingLogFileBuilder, BuildError> {
    let ini = Ini::load_from_str(text).map_err(|err| BuildError::Ini(err.to_string()))?;
    let props = ini
        .section(Some(section))
        .ok_or_else(|| BuildError::Ini(format!("missing section [{section}]")))?;
    if let Some((key, _)) = props.iter().find(|(key, _)| !KNOWN_KEYS.contains(key)) {
        return Err(BuildError::Ini(format!("unknown key {key:?} in [{section}]")));
    }

    let directory = required(props, section, "directory")?;
    let prefix = required(props, section, "prefix")?;
    let mut builder = RotatingLogFileBuilder::new(directory, prefix);
    if let Some(v) = parse_value(props, section, "max_files")? {
        builder = builder.with_max_files(v);
    }
    if let Some(v) = parse_value(props, section, "max_records")? {
        builder = builder.with_max_records(v);
    }
    if let Some(v) = parse_value(props, section, "queue_capacity")? {
        builder = builder.with_queue_capacity(v);
    }
    if let Some(v) = parse_value(props, section, "flush_interval")? {
        builder = builder.with_flush_interval(v);
    }
    Ok(builder)
}

fn required<'a>(props: &'a Properties, section: &str, key: &str) -> Result<&'a str, BuildError> {
    props
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BuildError::Ini(format!("[{section}] requires {key}")))
}

fn parse_value<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
) -> Result<Option<T>, BuildError> {
    props
        .get(key)
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                BuildError::Ini(format!("[{section}] {key} is not a valid number: {raw:?}"))
            })
        })
        .transpose()
}
