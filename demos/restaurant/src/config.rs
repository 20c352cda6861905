//! Configuration management for the restaurant console.
//!
//! Loads configuration from environment variables with sensible defaults.

use reseasy_core::{SlotNumber, Tier};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default floor plan: capacities in table-number order
pub const DEFAULT_TABLES: &str = "2,4,6,6,8";

/// Default audit log path
pub const DEFAULT_AUDIT_LOG: &str = "reservation_log.csv";

/// Default currency prefix
pub const DEFAULT_CURRENCY: &str = "Rs.";

/// Errors from malformed configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be used
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Environment variable name
        var: &'static str,
        /// Value as found
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tables as `(number, capacity)`, numbered from 1
    pub tables: Vec<(SlotNumber, Tier)>,
    /// Where the CSV audit trail is appended
    pub audit_log: PathBuf,
    /// Prefix printed before amounts
    pub currency: String,
    /// Install the Prometheus recorder
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tables = parse_tables(
            &lookup("RESEASY_TABLES").unwrap_or_else(|| DEFAULT_TABLES.to_string()),
            &Tier::STANDARD,
        )?;

        let metrics_enabled = match lookup("RESEASY_METRICS_ENABLED") {
            Some(value) => parse_flag("RESEASY_METRICS_ENABLED", &value)?,
            None => false,
        };

        Ok(Self {
            tables,
            audit_log: lookup("RESEASY_AUDIT_LOG")
                .filter(|path| !path.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG), PathBuf::from),
            currency: lookup("RESEASY_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            metrics_enabled,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tables: reseasy_runtime::standard_layout(),
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            currency: DEFAULT_CURRENCY.to_string(),
            metrics_enabled: false,
        }
    }
}

/// Parse a comma-separated list of capacities into numbered tables
///
/// # Errors
///
/// Returns [`ConfigError`] if the list is empty, an entry is not a number, or
/// a capacity is not one of `tiers`.
pub fn parse_tables(value: &str, tiers: &[Tier]) -> Result<Vec<(SlotNumber, Tier)>, ConfigError> {
    const VAR: &str = "RESEASY_TABLES";

    let capacities: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if capacities.is_empty() {
        return Err(ConfigError::invalid(VAR, value, "at least one table is required"));
    }

    capacities
        .into_iter()
        .zip(1..)
        .map(|(part, number)| {
            let seats: u32 = part
                .parse()
                .map_err(|_| ConfigError::invalid(VAR, value, format!("{part:?} is not a capacity")))?;
            let tier = Tier::new(seats);
            if !tiers.contains(&tier) {
                return Err(ConfigError::invalid(
                    VAR,
                    value,
                    format!("no {tier} tier exists"),
                ));
            }
            Ok((SlotNumber::new(number), tier))
        })
        .collect()
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid(var, value, "expected true or false")),
    }
}
