//! Restaurant reservation console.
//!
//! Reads menu answers from stdin and prints screens to stdout. Logs go to
//! stderr so they do not interleave with prompts; set `RUST_LOG` to adjust.

use reseasy_core::environment::SystemClock;
use reseasy_runtime::ReservationEngine;
use reseasy_runtime::metrics::MetricsRecorder;
use restaurant::{Config, Console, CsvAuditLog};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restaurant=info,reseasy_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        tables = config.tables.len(),
        audit_log = %config.audit_log.display(),
        metrics_enabled = config.metrics_enabled,
        "Configuration loaded"
    );

    let mut recorder = MetricsRecorder::new();
    if config.metrics_enabled {
        recorder.install()?;
    }

    let audit = Arc::new(CsvAuditLog::new(&config.audit_log));
    if let Err(e) = audit.check() {
        warn!(
            audit_log = %audit.path().display(),
            error = %e,
            "Could not write to audit log; bookings will continue without it"
        );
    }
    let engine = ReservationEngine::builder()
        .tables(config.tables.iter().copied())
        .clock(Arc::new(SystemClock))
        .audit_log(audit)
        .build()?;

    let console = Console::new(engine.clone(), config.currency);
    let mut stdout = tokio::io::stdout();
    console.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    let dropped = engine.shutdown();
    if dropped > 0 {
        warn!(dropped, "Tables still booked at exit were released without charge");
    }
    if let Some(snapshot) = recorder.render() {
        println!("\n--- Metrics ---\n{snapshot}");
    }

    Ok(())
}
