//! Access log writer
//!
//! Access lines go to a file or stdout. Diagnostics never come through
//! here; they go to the tracing subscriber.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global access log sink
static ACCESS_LOG: OnceLock<AccessLog> = OnceLock::new();

/// Log output target
#[derive(Debug)]
enum LogTarget {
    Stdout,
    File(Mutex<File>),
}

#[derive(Debug)]
pub struct AccessLog {
    target: LogTarget,
}

impl AccessLog {
    /// Append to `path`, or write to stdout when `None`
    pub fn open(path: Option<&str>) -> io::Result<Self> {
        let target = match path {
            Some(p) => LogTarget::File(Mutex::new(open_log_file(p)?)),
            None => LogTarget::Stdout,
        };
        Ok(Self { target })
    }

    pub fn write_line(&self, line: &str) {
        match &self.target {
            LogTarget::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{line}");
            }
            LogTarget::File(file) => {
                if let Ok(mut f) = file.lock() {
                    if let Err(e) = writeln!(f, "{line}") {
                        tracing::warn!(error = %e, "failed to write access log");
                    }
                }
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global access log; only the first call takes effect
pub fn init(path: Option<&str>) -> io::Result<()> {
    let log = AccessLog::open(path)?;
    if ACCESS_LOG.set(log).is_err() {
        tracing::debug!("access log already initialized");
    }
    Ok(())
}

/// Write one line to the access log, or stdout before `init`
pub fn write_access(line: &str) {
    match ACCESS_LOG.get() {
        Some(log) => log.write_line(line),
        None => println!("{line}"),
    }
}
