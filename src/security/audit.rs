//! Append-only audit trail.
//!
//! Stored at `<root>/offline_logs/agent.log`. One event per line:
//!
//! ```text
//! 2026-10-17T09:30:12.482913Z verify ok: checked=12 missing=0 mismatched=0
//! 2026-10-17T09:31:40.007215Z unauthorized erase attempt: /opt/app/agent
//! ```
//!
//! The log is created on first write and is never read back, rotated,
//! or truncated by this crate.
//!
//! # Ordering
//!
//! Appends are serialized twice: a `Mutex` orders writers sharing one
//! [`AuditLog`] handle, and an advisory exclusive lock (fs2 `flock`) on the
//! open file orders writers in other processes. Each lock covers exactly
//! one line write.
//!
//! # Failure
//!
//! A failed append never fails the operation being logged. Callers use
//! [`AuditLog::record`], which downgrades the error to a `tracing` warning
//! and hands back the warning text for display.

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Timestamp format: ISO 8601, microsecond precision, UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Failed to create audit log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write audit log {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to the audit log file.
///
/// Constructed once at startup and passed by reference to everything that
/// records events.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped event line.
    ///
    /// Embedded line breaks are replaced with spaces so that an event is
    /// always exactly one line.
    pub fn append(&self, message: &str) -> Result<(), AuditError> {
        let ts = chrono::Utc::now().format(TIMESTAMP_FORMAT);
        let line = format!("{} {}\n", ts, single_line(message));

        // A poisoned lock only means another writer panicked; the file is
        // still line-consistent because each write is one call.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_line(&line)
    }

    /// Append an event, downgrading failure to a warning.
    ///
    /// Returns the warning text when the event could not be written.
    pub fn record(&self, message: &str) -> Option<String> {
        match self.append(message) {
            Ok(()) => None,
            Err(e) => {
                warn!("Audit event not recorded ({}): {}", e, message);
                Some(e.to_string())
            }
        }
    }

    fn write_line(&self, line: &str) -> Result<(), AuditError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| AuditError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source| AuditError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        file.lock_exclusive().map_err(write_err)?;
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        let _ = FileExt::unlock(&file);
        written.map_err(write_err)
    }
}

fn single_line(message: &str) -> String {
    message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn creates_parent_dirs_on_first_write() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("offline_logs").join("agent.log");
        let log = AuditLog::new(&path);
        assert!(!path.exists());

        log.append("verify ok").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn line_format_is_timestamp_then_message() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::new(tmp.path().join("agent.log"));
        log.append("erase OK: /tmp/x").unwrap();

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 1);

        let (ts, msg) = lines[0].split_once(' ').unwrap();
        assert_eq!(msg, "erase OK: /tmp/x");
        assert!(ts.ends_with('Z'));
        // YYYY-MM-DDTHH:MM:SS.ffffffZ
        assert_eq!(ts.len(), 27);
        assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn appends_never_truncate() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::new(tmp.path().join("agent.log"));
        log.append("first").unwrap();

        // A second handle on the same path appends after existing content
        let again = AuditLog::new(tmp.path().join("agent.log"));
        again.append("second").unwrap();

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" first"));
        assert!(lines[1].ends_with(" second"));
    }

    #[test]
    fn multiline_message_stays_on_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let log = AuditLog::new(tmp.path().join("agent.log"));
        log.append("erase FAIL: /x\r\npermission denied").unwrap();

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("erase FAIL: /x  permission denied"));
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Arc::new(AuditLog::new(tmp.path().join("agent.log")));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(&format!("writer={} seq={} {}", t, i, "x".repeat(200)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 200);
        for line in &lines {
            assert!(line.ends_with(&"x".repeat(200)), "torn line: {}", line);
        }
    }

    #[test]
    fn record_reports_failure_as_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();

        let log = AuditLog::new(blocker.join("agent.log"));
        assert!(log.append("x").is_err());
        let warning = log.record("x");
        assert!(warning.is_some());
    }
}
