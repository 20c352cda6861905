//! Shared revenue accumulator.
//!
//! Credited from expiry tasks and from the operator's forced releases, possibly
//! at the same time. The total only ever grows.

use crate::metrics::{REVENUE_COLLECTED, counter};
use reseasy_core::Money;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running revenue total, in minor units
#[derive(Debug, Default)]
pub struct RevenueLedger {
    total: AtomicU64,
}

impl RevenueLedger {
    /// Create an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
        }
    }

    /// Atomically add `amount`, saturating at the maximum representable total
    ///
    /// Returns the new total.
    pub fn add(&self, amount: Money) -> Money {
        let previous = self
            .total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |total| {
                Some(total.saturating_add(amount.minor()))
            })
            .unwrap_or_else(|total| total);
        counter!(REVENUE_COLLECTED).increment(amount.minor());
        Money::from_minor(previous.saturating_add(amount.minor()))
    }

    /// Current total
    #[must_use]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total.load(Ordering::Acquire))
    }
}
