//! RawEvent to NormalizedMeeting conversion.
//!
//! An accepted event (one the link matcher produced a
//! [`ConferencingLink`] for) is flattened into the output record: title,
//! rendered start/end, and the link as the location. All-day events do not
//! keep their own dates; they take the run-day bounds computed once per
//! scan (midnight of the run's current date to midnight of the following
//! date). Two all-day events on different dates therefore normalize to
//! identical boundaries; that quirk is carried deliberately.

use chrono::{DateTime, Duration, Utc};

use meetscan_core::{ConferencingLink, NormalizedMeeting};

use crate::raw_event::RawEvent;

/// The rendered bounds assigned to all-day events, computed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBounds {
    /// Midnight of the run's current calendar date.
    pub start: String,
    /// Midnight of the following calendar date.
    pub end: String,
}

impl DayBounds {
    /// Computes the run-day bounds from the scan's reference instant.
    pub fn for_run(now: DateTime<Utc>) -> Self {
        let midnight = |dt: DateTime<Utc>| {
            dt.date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("valid time")
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        };
        Self {
            start: midnight(now),
            end: midnight(now + Duration::days(1)),
        }
    }
}

/// Flattens an accepted event and its link into the output record.
pub fn normalize_event(
    raw: &RawEvent,
    link: &ConferencingLink,
    day: &DayBounds,
) -> NormalizedMeeting {
    let (start, end) = if raw.is_all_day() {
        (day.start.clone(), day.end.clone())
    } else {
        (
            raw.start.rendered().to_string(),
            raw.end.rendered().to_string(),
        )
    };

    NormalizedMeeting::new(raw.effective_summary(), start, end, link.url.clone())
}
