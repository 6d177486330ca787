//! The run-event log sink.
//!
//! Every receive/send/start/finish event in the pipeline is written as
//! a `<sim_time>\t<description>` line to the console and, when
//! configured, to an append-mode file. The sink is owned by the
//! composition root and injected into each component, replacing
//! per-component file handles.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Timestamped run-event sink: console plus an optional append-mode
/// file.
///
/// Failing to open the file is a warning, not an error; the run
/// proceeds console-only. Write failures after a successful open are
/// ignored, matching the best-effort nature of the sink.
#[derive(Debug)]
pub struct RunLog {
    console: bool,
    file: Mutex<Option<LineWriter<std::fs::File>>>,
}

impl RunLog {
    /// Console sink plus an append-mode file sink at `path`.
    pub fn to_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(LineWriter::new(f)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open run log file");
                None
            }
        };
        Self {
            console: true,
            file: Mutex::new(file),
        }
    }

    /// Console sink only.
    pub fn stdout() -> Self {
        Self {
            console: true,
            file: Mutex::new(None),
        }
    }

    /// Discard everything. Useful in tests that assert on state rather
    /// than on log output.
    pub fn quiet() -> Self {
        Self {
            console: false,
            file: Mutex::new(None),
        }
    }

    /// Write one `<sim_time>\t<description>` line to every sink.
    pub fn record(&self, now: Duration, description: fmt::Arguments<'_>) {
        if !self.console && self.file.lock().map_or(true, |f| f.is_none()) {
            return;
        }
        let line = format!("{}\t{}", now.as_secs_f64(), description);
        if self.console {
            println!("{line}");
        }
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{line}");
            }
        }
    }
}
