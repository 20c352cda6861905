//! Append-only audit trail for table state changes.
//!
//! The engine hands every booking and release to an [`AuditLog`]. Backends are
//! free to fail; the engine logs the failure and carries on, so an unwritable
//! log never blocks or rolls back a reservation.

use crate::error::AuditError;
use crate::types::{Money, SlotNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What happened to a table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A party was seated, directly or from the waiting list
    Booked {
        /// Name the booking is held under
        name: String,
        /// Booked session length
        duration: Duration,
        /// Party size
        party_size: u32,
        /// Charge per person
        charge_per_person: Money,
    },
    /// The session ran out and the table freed itself
    AutoReleased {
        /// Amount credited to the ledger
        collected: Money,
    },
    /// The booking was cancelled without charge
    Cancelled,
    /// The operator freed the table early and billed the party
    ForceReleased {
        /// Amount credited to the ledger
        collected: Money,
    },
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booked {
                name,
                duration,
                party_size,
                charge_per_person,
            } => write!(
                f,
                "BOOKED by {name} for {} min. Members: {party_size}, Charge/person: {charge_per_person}",
                duration.as_secs() / 60
            ),
            Self::AutoReleased { collected } => write!(f, "AUTO-RELEASED. Collected: {collected}"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::ForceReleased { collected } => {
                write!(f, "FORCE-RELEASED. Collected: {collected}")
            }
        }
    }
}

/// One line of the audit trail: `(slot, timestamp, action)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Table the action applies to
    pub slot: SlotNumber,
    /// Wall-clock time of the action
    pub timestamp: DateTime<Utc>,
    /// The action itself
    pub action: AuditAction,
}

/// Append-only sink for audit entries
///
/// Implementations must be `Send + Sync`: expiry tasks write from runtime
/// worker threads while the operator thread writes bookings.
pub trait AuditLog: Send + Sync {
    /// Append one entry
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the entry could not be persisted.
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Audit log that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLog;

impl AuditLog for NoopAuditLog {
    fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
}
