//! Clocks for block timestamps.
//!
//! Block timestamps are hashed, so their text form is fixed: RFC 3339 in
//! UTC with nanosecond precision and a `Z` suffix
//! (`2024-01-01T00:00:00.000000000Z`). Wall-clock reads go through
//! [`Clock`] so tests can pin them.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{CoreError, CoreResult};

/// Source of block creation times
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;

    /// Current time in the hashed text form
    fn timestamp(&self) -> String {
        format_timestamp(&self.now())
    }
}

/// Format a time the way block timestamps are stored
#[must_use]
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored block timestamp
///
/// # Errors
///
/// Returns error if the text is not RFC 3339
pub fn parse_timestamp(text: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp {
            reason: format!("{text}: {e}"),
        })
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create a clock that always reports `time`
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// Create from seconds since the Unix epoch
    ///
    /// Seconds outside chrono's representable range fall back to the epoch.
    #[must_use]
    pub fn from_unix(seconds: i64) -> Self {
        Self(Utc.timestamp_opt(seconds, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that advances one second on every read
///
/// Reads past chrono's representable range report the epoch.
#[derive(Debug, Default)]
pub struct StepClock {
    start: i64,
    ticks: AtomicU64,
}

impl StepClock {
    /// Create a clock whose first read is `start` seconds after the epoch
    #[must_use]
    pub fn from_unix(start: i64) -> Self {
        Self {
            start,
            ticks: AtomicU64::new(0),
        }
    }

    /// Number of reads so far
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        let seconds = self.start.saturating_add(i64::try_from(tick).unwrap_or(i64::MAX));
        Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()
    }
}
