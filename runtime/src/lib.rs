//! # ResEasy Runtime
//!
//! The reservation lifecycle engine.
//!
//! A fixed pool of tables, grouped by capacity tier, is handed out to parties
//! for a bounded time. Each table frees itself when its time runs out; parties
//! that find no free table of their tier wait in a FIFO queue and are seated
//! whenever a table is released.
//!
//! ## Core Components
//!
//! - **[`ResourceSlot`]**: one table, its occupant and its expiry task
//! - **[`TierIndex`]**: tier lookup and free-table search
//! - **[`WaitingQueue`]**: FIFO of parties waiting for a table
//! - **[`RevenueLedger`]**: shared, monotonically increasing revenue total
//! - **[`ReservationEngine`]**: booking, cancellation, forced release, expiry
//!   handling and waiting-list promotion
//!
//! ## Concurrency
//!
//! Every occupied table runs one tokio task that sleeps for the session length.
//! A table's occupant, billing data, session counter and task handle sit
//! behind one mutex, and the expiry task re-checks its session under that mutex
//! before acting, so exactly one of expiry, cancel and forced release ends any
//! session. All seating (direct and from the waiting list) is serialised behind
//! the waiting-queue lock.
//!
//! ## Example
//!
//! ```no_run
//! use reseasy_core::{BookingOutcome, BookingRequest, Money};
//! use reseasy_runtime::ReservationEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ReservationEngine::builder().build()?;
//!
//! let outcome = engine.book(BookingRequest::minutes("Asha", 2, 60, Money::from_major(100)))?;
//! if let BookingOutcome::Seated { slot } = outcome {
//!     let collected = engine.force_release(slot)?;
//!     assert_eq!(collected, Money::from_major(200));
//! }
//! # Ok(())
//! # }
//! ```

/// Reservation engine orchestrating tables, queue and ledger
pub mod engine;

/// Shared revenue accumulator
pub mod ledger;

/// Metric names and the Prometheus recorder
pub mod metrics;

/// FIFO waiting list
pub mod queue;

/// A single bookable table
pub mod slot;

/// Capacity-tier lookup over the table pool
pub mod tier;

pub use engine::{
    ReservationEngine, ReservationEngineBuilder, ReservationEnvironment, standard_layout,
};
pub use ledger::RevenueLedger;
pub use queue::WaitingQueue;
pub use slot::{Occupancy, ResourceSlot};
pub use tier::TierIndex;
