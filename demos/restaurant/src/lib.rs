//! Restaurant operator console for the ResEasy reservation engine.
//!
//! The binary wires the engine to a CSV audit file and a text menu on
//! stdin/stdout. The pieces live here so they can be tested without a
//! terminal.

/// CSV file audit log
pub mod audit;

/// Environment configuration
pub mod config;

/// Menu loop and screen formatting
pub mod console;

pub use audit::CsvAuditLog;
pub use config::{Config, ConfigError};
pub use console::{Command, Console};
