//! Error types for reservation operations.
//!
//! Every variant is recoverable: the operator console reports it and keeps
//! serving commands.

use crate::types::SlotNumber;
use thiserror::Error;

/// Convenience alias for results of reservation operations
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Errors returned by the reservation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// A request field was empty or non-positive
    #[error("Invalid {field}: {reason}")]
    InvalidArgument {
        /// The offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// No table with this number exists
    #[error("Table {0} doesn't exist")]
    NotFound(SlotNumber),

    /// The operation needs an occupied table but this one is free
    #[error("Table {0} is not booked")]
    NotOccupied(SlotNumber),

    /// Attempted to seat a party at a table that is already occupied
    ///
    /// Allocation only picks free tables under the coordinator lock, so this
    /// signals a broken precondition rather than a normal outcome.
    #[error("Table {0} is already occupied")]
    AlreadyOccupied(SlotNumber),

    /// The table layout handed to the engine is unusable
    #[error("Invalid table layout: {0}")]
    InvalidLayout(String),

    /// The engine was created outside a tokio runtime and cannot schedule expiry
    #[error("No async runtime available to schedule table expiry")]
    RuntimeUnavailable,
}

impl ReservationError {
    /// Shorthand for [`ReservationError::InvalidArgument`]
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from an audit log backend
///
/// The engine never propagates these; they are logged and counted.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Writing to the backing file failed
    #[error("Could not write to log: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the entry for another reason
    #[error("Audit log unavailable: {0}")]
    Unavailable(String),
}

/// A money amount could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid amount: {0:?} (expected e.g. 120 or 99.50)")]
pub struct ParseMoneyError(pub String);
