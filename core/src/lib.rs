//! # ResEasy Core
//!
//! Domain types and environment traits for the ResEasy reservation engine.
//!
//! This crate has no runtime of its own. It defines the vocabulary shared by
//! the engine (`reseasy-runtime`), its test doubles (`reseasy-testing`) and the
//! operator console:
//!
//! - **Types**: slot numbers, capacity tiers, money, booking requests and the
//!   snapshots handed to presentation code
//! - **Errors**: the recoverable failures of every reservation operation
//! - **Environment**: injected dependencies (`Clock`, `AuditLog`)
//!
//! ## Example
//!
//! ```
//! use reseasy_core::{BookingRequest, Money, Tier};
//!
//! let request = BookingRequest::minutes("Asha", 3, 45, Money::from_major(120));
//! assert_eq!(Tier::required_for(&Tier::STANDARD, request.party_size), Tier::new(4));
//! assert_eq!(request.bill(), Money::from_major(360));
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Domain value types
pub mod types;

/// Error types for reservation operations
pub mod error;

/// Append-only audit trail abstraction
pub mod audit;

/// Environment module - Dependency injection traits
///
/// External dependencies of the engine are abstracted behind traits and
/// injected at construction, so tests can substitute deterministic versions.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts wall-clock time for audit timestamps
    ///
    /// Session timing (expiry and remaining time) runs on the async runtime's
    /// monotonic clock; this trait only stamps records meant for humans.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use audit::{AuditAction, AuditEntry, AuditLog, NoopAuditLog};
pub use error::{AuditError, ParseMoneyError, ReservationError, Result};
pub use types::{
    BookingOutcome, BookingRequest, Money, OccupantSnapshot, SessionId, SlotNumber, SlotSnapshot,
    Tier, WaitingRequest,
};
