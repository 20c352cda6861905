//! A single bookable table.
//!
//! A [`ResourceSlot`] owns its occupant, the occupant's billing data and the
//! handle of the task that will free it. All of it sits behind one mutex, so a
//! transition (`occupy`, `release`, `cancel`, `expire`) is observed whole or
//! not at all.
//!
//! # Stale timers
//!
//! Aborting a tokio task only stops it at its next await point. An expiry task
//! that has already woken may still reach [`ResourceSlot::expire`] after the
//! session it was scheduled for has been cancelled and the table handed to
//! someone else. Each occupancy therefore carries a [`SessionId`] and `expire`
//! only acts when the session still matches.

use reseasy_core::{
    BookingRequest, Money, OccupantSnapshot, ReservationError, Result, SessionId, SlotNumber,
    SlotSnapshot, Tier,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A seated party: who, for how long, and what they owe
#[derive(Debug, Clone)]
pub struct Occupancy {
    /// Session this occupancy belongs to
    pub session: SessionId,
    /// The booking being served
    pub booking: BookingRequest,
    /// When the party was seated
    pub started_at: Instant,
}

impl Occupancy {
    /// Amount owed if the session is billed
    #[must_use]
    pub fn bill(&self) -> Money {
        self.booking.bill()
    }

    /// Time left in the session, never negative
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.booking
            .duration
            .saturating_sub(self.started_at.elapsed())
    }
}

#[derive(Debug)]
struct SlotState {
    occupancy: Option<Occupancy>,
    expiry: Option<JoinHandle<()>>,
    last_session: SessionId,
}

/// One bookable table with a fixed capacity
#[derive(Debug)]
pub struct ResourceSlot {
    number: SlotNumber,
    tier: Tier,
    state: Mutex<SlotState>,
}

impl ResourceSlot {
    /// Create a free table
    #[must_use]
    pub const fn new(number: SlotNumber, tier: Tier) -> Self {
        Self {
            number,
            tier,
            state: Mutex::new(SlotState {
                occupancy: None,
                expiry: None,
                last_session: SessionId::new(0),
            }),
        }
    }

    /// Table number
    #[must_use]
    pub const fn number(&self) -> SlotNumber {
        self.number
    }

    /// Table capacity
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a party is seated here
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.lock().occupancy.is_some()
    }

    /// Seat a party and schedule the table's expiry
    ///
    /// `on_expiry` runs on `runtime` once `booking.duration` has elapsed,
    /// receiving the new session's id. It is not run if the session is
    /// cancelled or released first, and when it does run it must go through
    /// [`ResourceSlot::expire`] to find out whether the session is still live.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::AlreadyOccupied`] if a party is already
    /// seated; the current occupant is left untouched.
    pub fn occupy<F>(
        &self,
        booking: BookingRequest,
        runtime: &Handle,
        on_expiry: F,
    ) -> Result<SessionId>
    where
        F: FnOnce(SessionId) + Send + 'static,
    {
        let mut state = self.lock();
        if state.occupancy.is_some() {
            return Err(ReservationError::AlreadyOccupied(self.number));
        }

        let session = state.last_session.next();
        let duration = booking.duration;
        state.last_session = session;
        state.occupancy = Some(Occupancy {
            session,
            booking,
            started_at: Instant::now(),
        });
        state.expiry = Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            on_expiry(session);
        }));

        tracing::trace!(slot = %self.number, session = %session, ?duration, "Slot occupied");
        Ok(session)
    }

    /// Free the table, cancelling any pending expiry
    ///
    /// Idempotent: returns `None` and changes nothing if the table is free.
    pub fn release(&self) -> Option<Occupancy> {
        Self::clear(&mut self.lock())
    }

    /// Stop the pending expiry of the current session, then free the table
    ///
    /// Used for both manual cancellation and forced release. Never bills: the
    /// returned occupancy lets the caller decide.
    pub fn cancel(&self) -> Option<Occupancy> {
        let mut state = self.lock();
        let ended = Self::clear(&mut state);
        if let Some(occupancy) = &ended {
            tracing::trace!(slot = %self.number, session = %occupancy.session, "Slot cancelled");
        }
        ended
    }

    /// Free the table on behalf of the expiry task of `session`
    ///
    /// Returns `None` when the table is free or occupied by a later session,
    /// meaning a cancel or forced release already ended `session`.
    pub fn expire(&self, session: SessionId) -> Option<Occupancy> {
        let mut state = self.lock();
        if state.occupancy.as_ref().map(|o| o.session) != Some(session) {
            return None;
        }
        // The firing task is the caller; drop its handle instead of aborting it.
        state.expiry = None;
        state.occupancy.take()
    }

    /// Time left before the table frees itself; zero when free
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.lock()
            .occupancy
            .as_ref()
            .map_or(Duration::ZERO, Occupancy::remaining)
    }

    /// Point-in-time view for presentation
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot {
        let state = self.lock();
        SlotSnapshot {
            number: self.number,
            tier: self.tier,
            occupant: state.occupancy.as_ref().map(|o| OccupantSnapshot {
                name: o.booking.name.clone(),
                party_size: o.booking.party_size,
                charge_per_person: o.booking.charge_per_person,
                duration: o.booking.duration,
                remaining: o.remaining(),
            }),
        }
    }

    fn clear(state: &mut SlotState) -> Option<Occupancy> {
        if let Some(expiry) = state.expiry.take() {
            expiry.abort();
        }
        state.occupancy.take()
    }
}
