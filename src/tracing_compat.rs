//! Integration with `tracing-subscriber`.
//!
//! Lets a [`RotatingLogFile`] back a `fmt` layer directly:
//!
//! ```no_run
//! use std::sync::Arc;
//! use rotalog::RotatingLogFile;
//!
//! let log = Arc::new(RotatingLogFile::new("/var/log/app", "app"));
//! tracing_subscriber::fmt().with_writer(log).init();
//! ```
//!
//! Each formatted event becomes one record.

use tracing_subscriber::fmt::MakeWriter;

use crate::handle::RotatingLogFile;

impl<'a> MakeWriter<'a> for RotatingLogFile {
    type Writer = &'a RotatingLogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
