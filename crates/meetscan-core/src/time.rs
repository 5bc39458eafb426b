//! Time window computation for calendar scans.
//!
//! A scan looks at a single window around "now": events that already started
//! up to `hours_before` ago, and events starting up to `hours_after` from
//! now. The window is handed to the provider adapters as the query range;
//! the scan itself does not re-filter fetched events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The admissible start-time range for a scan.
///
/// Represents a closed interval `[start, end]` in UTC. An event is in scope
/// when its start timestamp lies inside the interval, bounds included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates the scan window around a reference instant.
    ///
    /// The window covers `[now - hours_before, now + hours_after]`.
    pub fn around(now: DateTime<Utc>, hours_before: u32, hours_after: u32) -> Self {
        Self::new(
            now - Duration::hours(i64::from(hours_before)),
            now + Duration::hours(i64::from(hours_after)),
        )
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks whether an instant falls within this window, bounds included.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }
}
