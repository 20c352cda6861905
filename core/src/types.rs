//! Domain types for the ResEasy reservation engine.
//!
//! Value objects shared by the engine and the operator console. Everything here
//! is plain data: no locks, no timers.

use crate::error::{ParseMoneyError, ReservationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Identifiers
// ============================================================================

/// Number of a bookable table, unique within the pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotNumber(u32);

impl SlotNumber {
    /// Create a slot number
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Get the raw number
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one occupancy session of one slot
///
/// Sessions are numbered per slot and strictly increase, so an expiry task
/// scheduled for an earlier session can never act on a later occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a session id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The session that follows this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw id
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Capacity tiers
// ============================================================================

/// A capacity bucket used to match a party to a table
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier(u32);

impl Tier {
    /// The standard tier set, ascending
    pub const STANDARD: [Self; 4] = [Self(2), Self(4), Self(6), Self(8)];

    /// Create a tier seating `seats` people
    #[must_use]
    pub const fn new(seats: u32) -> Self {
        Self(seats)
    }

    /// Number of seats in this tier
    #[must_use]
    pub const fn seats(&self) -> u32 {
        self.0
    }

    /// Smallest tier in `tiers` that seats `party_size`
    ///
    /// `tiers` must be sorted ascending. Parties larger than the biggest tier
    /// are accepted at the biggest tier. An empty tier set maps every party to
    /// a tier of its own size.
    #[must_use]
    pub fn required_for(tiers: &[Self], party_size: u32) -> Self {
        tiers
            .iter()
            .copied()
            .find(|tier| tier.0 >= party_size)
            .or_else(|| tiers.last().copied())
            .unwrap_or(Self(party_size))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-seater", self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Amount of money in minor units (paise, cents)
///
/// Arithmetic saturates at `u64::MAX` rather than wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from minor units
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Creates a `Money` value from whole major units, saturating on overflow
    #[must_use]
    pub const fn from_major(major: u64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// Returns the amount in minor units
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, saturating on overflow
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies by a head count, saturating on overflow
    #[must_use]
    pub fn times(self, count: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(count)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses `"120"`, `"99.5"` or `"99.50"`; at most two fractional digits
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseMoneyError(s.to_string());

        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, ""),
        };
        if major.is_empty() || minor.len() > 2 {
            return Err(invalid());
        }
        if !major.bytes().chain(minor.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let major: u64 = major.parse().map_err(|_| invalid())?;
        let minor: u64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => minor.parse().map_err(|_| invalid())?,
        };

        major
            .checked_mul(100)
            .and_then(|m| m.checked_add(minor))
            .map(Self)
            .ok_or_else(invalid)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A request to seat a party for a bounded time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Name the booking is held under
    pub name: String,
    /// Number of people in the party
    pub party_size: u32,
    /// How long the table is held
    pub duration: Duration,
    /// Charge per person, billed when the session completes
    pub charge_per_person: Money,
}

impl BookingRequest {
    /// Create a booking request
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        party_size: u32,
        duration: Duration,
        charge_per_person: Money,
    ) -> Self {
        Self {
            name: name.into(),
            party_size,
            duration,
            charge_per_person,
        }
    }

    /// Create a booking request held for whole minutes
    #[must_use]
    pub fn minutes(
        name: impl Into<String>,
        party_size: u32,
        minutes: u64,
        charge_per_person: Money,
    ) -> Self {
        Self::new(
            name,
            party_size,
            Duration::from_secs(minutes.saturating_mul(60)),
            charge_per_person,
        )
    }

    /// Total owed for the session: party size times the per-person charge
    #[must_use]
    pub fn bill(&self) -> Money {
        self.charge_per_person.times(self.party_size)
    }

    /// Reject empty names and non-positive size, duration or charge
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ReservationError::invalid("name", "must not be empty"));
        }
        if self.party_size == 0 {
            return Err(ReservationError::invalid("party_size", "must be positive"));
        }
        if self.duration.is_zero() {
            return Err(ReservationError::invalid("duration", "must be positive"));
        }
        if self.charge_per_person.is_zero() {
            return Err(ReservationError::invalid(
                "charge_per_person",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// A booking that could not be seated and waits for a table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingRequest {
    /// Enqueue order, strictly increasing across the queue's lifetime
    pub order: u64,
    /// The original request
    pub request: BookingRequest,
}

// ============================================================================
// Outcomes and snapshots
// ============================================================================

/// Result of a successful `book` call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOutcome {
    /// The party was seated at a table
    Seated {
        /// The allocated table
        slot: SlotNumber,
    },
    /// Every table of the required tier was busy
    Queued {
        /// 1-based position in the waiting list
        position: usize,
        /// Tier the party is waiting for
        tier: Tier,
    },
}

/// Point-in-time view of one table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// Table number
    pub number: SlotNumber,
    /// Table capacity
    pub tier: Tier,
    /// Current occupant, if any
    pub occupant: Option<OccupantSnapshot>,
}

impl SlotSnapshot {
    /// Whether the table is free
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Point-in-time view of a table's occupant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantSnapshot {
    /// Name the booking is held under
    pub name: String,
    /// Number of people seated
    pub party_size: u32,
    /// Charge per person
    pub charge_per_person: Money,
    /// Full session length
    pub duration: Duration,
    /// Time left before the table auto-releases
    pub remaining: Duration,
}
