//! In-memory audit log doubles
//!
//! - [`RecordingAuditLog`]: keeps every entry for later assertions
//! - [`FailingAuditLog`]: refuses every entry, for exercising the
//!   "audit failures are never fatal" path

use reseasy_core::{AuditAction, AuditEntry, AuditError, AuditLog, SlotNumber};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Audit log that records entries in memory
///
/// # Example
///
/// ```
/// use reseasy_testing::RecordingAuditLog;
/// use reseasy_core::{AuditAction, AuditEntry, AuditLog, SlotNumber, Utc};
///
/// let log = RecordingAuditLog::new();
/// log.append(&AuditEntry {
///     slot: SlotNumber::new(1),
///     timestamp: Utc::now(),
///     action: AuditAction::Cancelled,
/// }).unwrap();
/// assert_eq!(log.actions_for(SlotNumber::new(1)), vec![AuditAction::Cancelled]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl RecordingAuditLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded entry, in append order
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Actions recorded for one table, in append order
    #[must_use]
    pub fn actions_for(&self, slot: SlotNumber) -> Vec<AuditAction> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.slot == slot)
            .map(|entry| entry.action)
            .collect()
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for RecordingAuditLog {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

/// Audit log whose every append fails
#[derive(Debug, Default)]
pub struct FailingAuditLog {
    attempts: AtomicUsize,
}

impl FailingAuditLog {
    /// Create a failing log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }

    /// How many appends were attempted
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuditLog for FailingAuditLog {
    fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::Unavailable("disk full".to_string()))
    }
}
