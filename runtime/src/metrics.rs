//! Prometheus metrics for the reservation engine.
//!
//! The engine records through the `metrics` facade; nothing is collected until
//! a recorder is installed. [`MetricsRecorder`] installs the Prometheus one and
//! renders its text exposition on demand.
//!
//! # Example
//!
//! ```rust,no_run
//! use reseasy_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... run the engine ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge};

/// Parties seated at a table (directly or from the waiting list)
pub const RESERVATIONS_SEATED: &str = "reservations_seated_total";
/// Parties added to the waiting list
pub const RESERVATIONS_QUEUED: &str = "reservations_queued_total";
/// Sessions ended by their timer
pub const RESERVATIONS_EXPIRED: &str = "reservations_expired_total";
/// Sessions cancelled without charge
pub const RESERVATIONS_CANCELLED: &str = "reservations_cancelled_total";
/// Sessions ended early by the operator and billed
pub const RESERVATIONS_FORCE_RELEASED: &str = "reservations_force_released_total";
/// Waiting parties moved into a freed table
pub const WAITING_PROMOTIONS: &str = "waiting_promotions_total";
/// Revenue credited to the ledger, in minor units
pub const REVENUE_COLLECTED: &str = "revenue_collected_minor_units_total";
/// Audit entries that could not be written
pub const AUDIT_WRITE_FAILURES: &str = "audit_write_failures_total";
/// Current waiting list length
pub const WAITING_QUEUE_DEPTH: &str = "waiting_queue_depth";
/// Tables currently occupied
pub const SLOTS_OCCUPIED: &str = "slots_occupied";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Installed Prometheus recorder.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the recorder cannot be installed.
    ///
    /// # Note
    ///
    /// Only one global recorder can exist per process. If one is already
    /// installed (e.g., in tests), this logs a warning and leaves the handle
    /// empty.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                register_metrics();
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the recorder hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(RESERVATIONS_SEATED, "Total number of parties seated at a table");
    describe_counter!(RESERVATIONS_QUEUED, "Total number of parties added to the waiting list");
    describe_counter!(RESERVATIONS_EXPIRED, "Total number of sessions ended by their timer");
    describe_counter!(RESERVATIONS_CANCELLED, "Total number of sessions cancelled without charge");
    describe_counter!(
        RESERVATIONS_FORCE_RELEASED,
        "Total number of sessions ended early by the operator"
    );
    describe_counter!(WAITING_PROMOTIONS, "Total number of waiting parties seated");
    describe_counter!(REVENUE_COLLECTED, "Revenue credited to the ledger, in minor units");
    describe_counter!(AUDIT_WRITE_FAILURES, "Total number of audit entries that failed to write");
    describe_gauge!(WAITING_QUEUE_DEPTH, "Number of parties on the waiting list");
    describe_gauge!(SLOTS_OCCUPIED, "Number of tables currently occupied");
}
