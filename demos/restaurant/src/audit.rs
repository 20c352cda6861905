//! CSV file audit log.
//!
//! One line per action: `table,YYYY-MM-DD HH:MM:SS,description`, with the
//! timestamp in local time. The file is opened on every append, so a log that
//! is unwritable at start-up starts working once its directory exists.

use chrono::Local;
use reseasy_core::{AuditEntry, AuditError, AuditLog};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Timestamp layout of the CSV trail
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Audit log appending CSV lines to a file
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    // Serialises appends from the operator and from expiry tasks.
    write: Mutex<()>,
}

impl CsvAuditLog {
    /// Log to `path`; nothing is opened until the first append
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write: Mutex::new(()),
        }
    }

    /// The file being written
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that the file can be opened for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file cannot be opened.
    pub fn check(&self) -> Result<(), AuditError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }
}

/// Render one entry as a CSV line, including the trailing newline
#[must_use]
pub fn format_line(entry: &AuditEntry) -> String {
    format!(
        "{},{},{}\n",
        entry.slot,
        entry.timestamp.with_timezone(&Local).format(TIMESTAMP_FORMAT),
        entry.action
    )
}

impl AuditLog for CsvAuditLog {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = format_line(entry);
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
