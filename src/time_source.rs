//! Clock abstraction.
//!
//! The orchestrator asks a [`TimeSource`] for "now" exactly once per run, so a
//! run can be replayed for any past date with `--at` and tests never depend on
//! the wall clock.

use chrono::{DateTime, NaiveDateTime, Utc};

pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Whether `now` is pinned rather than read from the system clock.
    fn is_fixed(&self) -> bool {
        false
    }
}

/// The system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    at: DateTime<Utc>,
}

impl FixedTimeSource {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    fn is_fixed(&self) -> bool {
        true
    }
}

/// Parse an `--at` value: RFC 3339, or `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`
/// taken as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(format!(
        "invalid datetime '{value}' (expected RFC 3339 or YYYY-MM-DDTHH:MM:SS)"
    ))
}
