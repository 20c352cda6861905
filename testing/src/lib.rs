//! # ResEasy Testing
//!
//! Testing utilities for the ResEasy reservation engine.
//!
//! This crate provides:
//! - Deterministic implementations of the engine's environment traits
//! - Audit log doubles that record or refuse entries
//! - Builders for common booking requests
//!
//! ## Example
//!
//! ```ignore
//! use reseasy_testing::{RecordingAuditLog, party, test_clock};
//! use reseasy_runtime::ReservationEngine;
//! use std::sync::Arc;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_booking_is_audited() {
//!     let audit = Arc::new(RecordingAuditLog::new());
//!     let engine = ReservationEngine::builder()
//!         .clock(Arc::new(test_clock()))
//!         .audit_log(audit.clone())
//!         .build()
//!         .unwrap();
//!
//!     engine.book(party("Asha", 2, 30)).unwrap();
//!     assert_eq!(audit.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use reseasy_core::environment::Clock;

/// Audit log doubles
pub mod audit_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making audit timestamps reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reseasy_testing::mocks::FixedClock;
    /// use reseasy_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Builders for common booking requests
pub mod helpers {
    use reseasy_core::{BookingRequest, Money};

    /// Standard per-person charge used by [`party`]: 100.00
    pub const CHARGE_PER_PERSON: Money = Money::from_major(100);

    /// A booking for `party_size` people held `minutes` at [`CHARGE_PER_PERSON`]
    #[must_use]
    pub fn party(name: &str, party_size: u32, minutes: u64) -> BookingRequest {
        BookingRequest::minutes(name, party_size, minutes, CHARGE_PER_PERSON)
    }
}

// Re-export commonly used items
pub use audit_mocks::{FailingAuditLog, RecordingAuditLog};
pub use helpers::{CHARGE_PER_PERSON, party};
pub use mocks::{FixedClock, test_clock};
