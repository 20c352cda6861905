//! Reservation engine.
//!
//! Orchestrates booking, cancellation, forced release, expiry and waiting-list
//! promotion over a fixed pool of tables.
//!
//! # Locking
//!
//! - Each [`ResourceSlot`] guards its own occupancy.
//! - The waiting-queue mutex doubles as the allocation coordinator: every
//!   `occupy` (direct booking or promotion) happens while it is held, so a free
//!   table found by the index cannot be taken by someone else before it is
//!   occupied, and promotions run one at a time in queue order.
//! - Lock order is always queue, then slot. Releases take only the slot lock
//!   and drop it before promoting.

use crate::ledger::RevenueLedger;
use crate::metrics::{
    AUDIT_WRITE_FAILURES, RESERVATIONS_CANCELLED, RESERVATIONS_EXPIRED,
    RESERVATIONS_FORCE_RELEASED, RESERVATIONS_QUEUED, RESERVATIONS_SEATED, SLOTS_OCCUPIED,
    WAITING_PROMOTIONS, WAITING_QUEUE_DEPTH, counter, gauge,
};
use crate::queue::WaitingQueue;
use crate::slot::ResourceSlot;
use crate::tier::TierIndex;
use reseasy_core::environment::{Clock, SystemClock};
use reseasy_core::{
    AuditAction, AuditEntry, AuditLog, BookingOutcome, BookingRequest, Money, NoopAuditLog,
    ReservationError, Result, SessionId, SlotNumber, SlotSnapshot, Tier, WaitingRequest,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

/// The default floor plan: five tables of capacities 2, 4, 6, 6 and 8
#[must_use]
pub fn standard_layout() -> Vec<(SlotNumber, Tier)> {
    [2, 4, 6, 6, 8]
        .into_iter()
        .zip(1..)
        .map(|(seats, number)| (SlotNumber::new(number), Tier::new(seats)))
        .collect()
}

/// Environment dependencies for the reservation engine
#[derive(Clone)]
pub struct ReservationEnvironment {
    /// Clock for audit timestamps
    pub clock: Arc<dyn Clock>,
    /// Append-only audit trail
    pub audit: Arc<dyn AuditLog>,
}

impl ReservationEnvironment {
    /// Creates a new `ReservationEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, audit: Arc<dyn AuditLog>) -> Self {
        Self { clock, audit }
    }
}

impl Default for ReservationEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(NoopAuditLog))
    }
}

/// Builder for [`ReservationEngine`]
///
/// Defaults: [`standard_layout`], [`Tier::STANDARD`], a fresh ledger, the
/// system clock and an audit log that discards entries.
#[must_use]
pub struct ReservationEngineBuilder {
    tables: Vec<(SlotNumber, Tier)>,
    tiers: Vec<Tier>,
    ledger: Option<Arc<RevenueLedger>>,
    env: ReservationEnvironment,
    runtime: Option<Handle>,
}

impl ReservationEngineBuilder {
    fn new() -> Self {
        Self {
            tables: standard_layout(),
            tiers: Tier::STANDARD.to_vec(),
            ledger: None,
            env: ReservationEnvironment::default(),
            runtime: None,
        }
    }

    /// Set the tables, as `(number, capacity)` pairs in any order
    pub fn tables(mut self, tables: impl IntoIterator<Item = (SlotNumber, Tier)>) -> Self {
        self.tables = tables.into_iter().collect();
        self
    }

    /// Set the tier set used to size parties
    pub fn tiers(mut self, tiers: &[Tier]) -> Self {
        self.tiers = tiers.to_vec();
        self
    }

    /// Share an existing revenue ledger
    pub fn ledger(mut self, ledger: Arc<RevenueLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set the clock used for audit timestamps
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.env.clock = clock;
        self
    }

    /// Set the audit log
    pub fn audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.env.audit = audit;
        self
    }

    /// Set the runtime that expiry tasks are spawned on
    ///
    /// Defaults to the runtime `build` is called from.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidLayout`] if there are no tables, a table
    ///   number repeats, or a capacity is not in the tier set
    /// - [`ReservationError::RuntimeUnavailable`] if no runtime was given and
    ///   `build` is not called from within a tokio runtime
    pub fn build(self) -> Result<ReservationEngine> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| ReservationError::RuntimeUnavailable)?,
        };

        if self.tables.is_empty() {
            return Err(ReservationError::InvalidLayout(
                "at least one table is required".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        if let Some((duplicate, _)) = self.tables.iter().find(|(number, _)| !seen.insert(*number)) {
            return Err(ReservationError::InvalidLayout(format!(
                "table {duplicate} is listed twice"
            )));
        }

        let mut tables = self.tables;
        tables.sort_by_key(|(number, _)| *number);
        let slots: Vec<ResourceSlot> = tables
            .into_iter()
            .map(|(number, tier)| ResourceSlot::new(number, tier))
            .collect();
        let index = TierIndex::new(&self.tiers, &slots)?;

        info!(tables = slots.len(), tiers = ?index.tiers(), "Reservation engine ready");

        Ok(ReservationEngine {
            inner: Arc::new(EngineInner {
                slots,
                index,
                waiting: Mutex::new(WaitingQueue::new()),
                ledger: self.ledger.unwrap_or_default(),
                env: self.env,
                runtime,
            }),
        })
    }
}

/// Books tables, frees them, and seats waiting parties
///
/// Cheap to clone; clones share the same tables, queue and ledger.
#[derive(Clone)]
pub struct ReservationEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    slots: Vec<ResourceSlot>,
    index: TierIndex,
    waiting: Mutex<WaitingQueue>,
    ledger: Arc<RevenueLedger>,
    env: ReservationEnvironment,
    runtime: Handle,
}

impl ReservationEngine {
    /// Start building an engine
    pub fn builder() -> ReservationEngineBuilder {
        ReservationEngineBuilder::new()
    }

    /// Seat a party at a free table of its tier, or put it on the waiting list
    ///
    /// A free table is used even if others are already waiting for that tier.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidArgument`] for an empty name or a
    /// non-positive party size, duration or charge.
    pub fn book(&self, request: BookingRequest) -> Result<BookingOutcome> {
        request.validate()?;
        let tier = self.inner.index.required_tier(request.party_size);

        let mut waiting = self.inner.lock_waiting();
        if let Some(slot) = self.inner.seat(tier, &request)? {
            return Ok(BookingOutcome::Seated { slot });
        }

        debug!(name = %request.name, %tier, "No free table, adding to waiting list");
        let position = waiting.enqueue(request);
        counter!(RESERVATIONS_QUEUED).increment(1);
        #[allow(clippy::cast_precision_loss)]
        gauge!(WAITING_QUEUE_DEPTH).set(waiting.len() as f64);
        info!(position, %tier, "All tables of tier are full, added to waiting list");

        Ok(BookingOutcome::Queued { position, tier })
    }

    /// Cancel the booking at `number` without charging, then promote
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] if no such table exists
    /// - [`ReservationError::NotOccupied`] if the table is free
    pub fn cancel(&self, number: SlotNumber) -> Result<()> {
        let slot = self.inner.slot(number)?;
        let occupancy = slot.cancel().ok_or(ReservationError::NotOccupied(number))?;

        counter!(RESERVATIONS_CANCELLED).increment(1);
        gauge!(SLOTS_OCCUPIED).decrement(1.0);
        info!(slot = %number, session = %occupancy.session, "Booking cancelled");
        self.inner.audit(number, AuditAction::Cancelled);

        self.inner.promote_waiting();
        Ok(())
    }

    /// End the session at `number` early, bill it, then promote
    ///
    /// Returns the amount collected.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] if no such table exists
    /// - [`ReservationError::NotOccupied`] if the table is free
    pub fn force_release(&self, number: SlotNumber) -> Result<Money> {
        let slot = self.inner.slot(number)?;
        let occupancy = slot.cancel().ok_or(ReservationError::NotOccupied(number))?;
        let collected = occupancy.bill();
        self.inner.ledger.add(collected);

        counter!(RESERVATIONS_FORCE_RELEASED).increment(1);
        gauge!(SLOTS_OCCUPIED).decrement(1.0);
        info!(slot = %number, session = %occupancy.session, %collected, "Table force-released");
        self.inner.audit(number, AuditAction::ForceReleased { collected });

        self.inner.promote_waiting();
        Ok(collected)
    }

    /// Seat the head of the waiting list if a table of its tier is free
    ///
    /// Only the head is tried. Returns the table it was seated at.
    pub fn promote_waiting(&self) -> Option<SlotNumber> {
        self.inner.promote_waiting()
    }

    /// Total revenue collected so far
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.inner.ledger.total()
    }

    /// The shared ledger
    #[must_use]
    pub fn ledger(&self) -> Arc<RevenueLedger> {
        Arc::clone(&self.inner.ledger)
    }

    /// Tier a party of `party_size` is seated in
    #[must_use]
    pub fn required_tier(&self, party_size: u32) -> Tier {
        self.inner.index.required_tier(party_size)
    }

    /// Status of every table, in table-number order
    #[must_use]
    pub fn slot_status(&self) -> Vec<SlotSnapshot> {
        self.inner.slots.iter().map(ResourceSlot::snapshot).collect()
    }

    /// Status of one table
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::NotFound`] if no such table exists.
    pub fn slot(&self, number: SlotNumber) -> Result<SlotSnapshot> {
        self.inner.slot(number).map(ResourceSlot::snapshot)
    }

    /// Time left at `number`; zero when free
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::NotFound`] if no such table exists.
    pub fn time_remaining(&self, number: SlotNumber) -> Result<Duration> {
        self.inner.slot(number).map(ResourceSlot::time_remaining)
    }

    /// The waiting list, oldest first
    #[must_use]
    pub fn waiting_list(&self) -> Vec<WaitingRequest> {
        self.inner.lock_waiting().snapshot()
    }

    /// Free every table without billing and stop all expiry tasks
    ///
    /// Returns how many sessions were dropped. The waiting list is kept.
    pub fn shutdown(&self) -> usize {
        let _waiting = self.inner.lock_waiting();
        let dropped = self
            .inner
            .slots
            .iter()
            .filter_map(ResourceSlot::release)
            .count();
        gauge!(SLOTS_OCCUPIED).set(0.0);
        info!(dropped, "Reservation engine shut down");
        dropped
    }
}

impl EngineInner {
    fn lock_waiting(&self) -> MutexGuard<'_, WaitingQueue> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, number: SlotNumber) -> Result<&ResourceSlot> {
        self.slots
            .binary_search_by_key(&number, ResourceSlot::number)
            .map(|position| &self.slots[position])
            .map_err(|_| ReservationError::NotFound(number))
    }

    /// Occupy the first free table of `tier` with `request`
    ///
    /// Caller must hold the waiting-queue lock.
    fn seat(self: &Arc<Self>, tier: Tier, request: &BookingRequest) -> Result<Option<SlotNumber>> {
        let Some(slot) = self.index.find_free(&self.slots, tier) else {
            return Ok(None);
        };
        let number = slot.number();

        let engine = Arc::downgrade(self);
        let session = slot.occupy(request.clone(), &self.runtime, move |session| {
            Self::on_expiry(&engine, number, session);
        })?;

        counter!(RESERVATIONS_SEATED).increment(1);
        gauge!(SLOTS_OCCUPIED).increment(1.0);
        info!(
            slot = %number,
            %session,
            name = %request.name,
            party_size = request.party_size,
            duration_secs = request.duration.as_secs(),
            "Table booked"
        );
        self.audit(
            number,
            AuditAction::Booked {
                name: request.name.clone(),
                duration: request.duration,
                party_size: request.party_size,
                charge_per_person: request.charge_per_person,
            },
        );

        Ok(Some(number))
    }

    fn promote_waiting(self: &Arc<Self>) -> Option<SlotNumber> {
        let mut waiting = self.lock_waiting();
        let head = waiting.peek_head()?.request.clone();
        let tier = self.index.required_tier(head.party_size);

        match self.seat(tier, &head) {
            Ok(Some(slot)) => {
                waiting.pop_head();
                counter!(WAITING_PROMOTIONS).increment(1);
                #[allow(clippy::cast_precision_loss)]
                gauge!(WAITING_QUEUE_DEPTH).set(waiting.len() as f64);
                info!(slot = %slot, name = %head.name, "Waiting customer assigned table");
                Some(slot)
            }
            Ok(None) => {
                trace!(name = %head.name, %tier, "Head of waiting list still blocked");
                None
            }
            Err(e) => {
                warn!(error = %e, name = %head.name, "Could not seat head of waiting list");
                None
            }
        }
    }

    fn on_expiry(engine: &Weak<Self>, number: SlotNumber, session: SessionId) {
        let Some(engine) = engine.upgrade() else {
            return;
        };
        engine.expire(number, session);
    }

    /// The auto-release transition of `session` at `number`
    fn expire(self: &Arc<Self>, number: SlotNumber, session: SessionId) {
        let Ok(slot) = self.slot(number) else {
            return;
        };
        let Some(occupancy) = slot.expire(session) else {
            trace!(slot = %number, %session, "Expiry for an ended session ignored");
            return;
        };

        let collected = occupancy.bill();
        self.ledger.add(collected);

        counter!(RESERVATIONS_EXPIRED).increment(1);
        gauge!(SLOTS_OCCUPIED).decrement(1.0);
        info!(slot = %number, %session, %collected, "Table auto-released");
        self.audit(number, AuditAction::AutoReleased { collected });

        self.promote_waiting();
    }

    fn audit(&self, slot: SlotNumber, action: AuditAction) {
        let entry = AuditEntry {
            slot,
            timestamp: self.env.clock.now(),
            action,
        };
        if let Err(e) = self.env.audit.append(&entry) {
            counter!(AUDIT_WRITE_FAILURES).increment(1);
            warn!(slot = %slot, error = %e, "Could not write to audit log");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let layout = standard_layout();
        let seats: Vec<u32> = layout.iter().map(|(_, tier)| tier.seats()).collect();
        assert_eq!(seats, vec![2, 4, 6, 6, 8]);
        assert_eq!(layout[0].0, SlotNumber::new(1));
        assert_eq!(layout[4].0, SlotNumber::new(5));
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let result = ReservationEngine::builder().build();
        assert!(matches!(result, Err(ReservationError::RuntimeUnavailable)));
    }

    #[tokio::test]
    async fn test_build_rejects_bad_layouts() {
        let empty = ReservationEngine::builder().tables(Vec::new()).build();
        assert!(matches!(empty, Err(ReservationError::InvalidLayout(_))));

        let duplicate = ReservationEngine::builder()
            .tables([
                (SlotNumber::new(1), Tier::new(2)),
                (SlotNumber::new(1), Tier::new(4)),
            ])
            .build();
        assert!(matches!(duplicate, Err(ReservationError::InvalidLayout(_))));

        let odd = ReservationEngine::builder()
            .tables([(SlotNumber::new(1), Tier::new(5))])
            .build();
        assert!(matches!(odd, Err(ReservationError::InvalidLayout(_))));
    }

    #[tokio::test]
    async fn test_tables_are_ordered_by_number() {
        let engine = ReservationEngine::builder()
            .tables([
                (SlotNumber::new(9), Tier::new(4)),
                (SlotNumber::new(3), Tier::new(2)),
            ])
            .build()
            .unwrap();
        let numbers: Vec<u32> = engine.slot_status().iter().map(|s| s.number.get()).collect();
        assert_eq!(numbers, vec![3, 9]);
        assert!(matches!(
            engine.slot(SlotNumber::new(4)),
            Err(ReservationError::NotFound(_))
        ));
    }
}
