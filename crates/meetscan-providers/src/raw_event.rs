//! Raw event type from calendar providers.
//!
//! [`RawEvent`] is the provider-agnostic shape of an event as it comes off
//! the wire, before link matching and normalization. Providers own the
//! construction; the scan only reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The time of a raw event.
///
/// Providers return either a zoned instant or a date-only value (all-day
/// events). Each variant keeps the provider's wire rendering of the
/// timestamp alongside the parsed value, so output can reproduce exactly
/// what the provider sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawEventTime {
    /// A zoned instant.
    Zoned {
        /// The instant, in UTC.
        utc: DateTime<Utc>,
        /// The provider's native rendering of this timestamp.
        rendered: String,
    },
    /// A date-only value (all-day event).
    AllDay {
        /// The date.
        date: NaiveDate,
        /// The provider's native rendering of this date.
        rendered: String,
    },
}

impl RawEventTime {
    /// Creates a zoned time, rendering it as RFC 3339.
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self::Zoned {
            utc,
            rendered: utc.to_rfc3339(),
        }
    }

    /// Creates a zoned time keeping the provider's wire rendering.
    pub fn from_wire(utc: DateTime<Utc>, rendered: impl Into<String>) -> Self {
        Self::Zoned {
            utc,
            rendered: rendered.into(),
        }
    }

    /// Creates an all-day time rendered as `YYYY-MM-DD`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay {
            date,
            rendered: date.to_string(),
        }
    }

    /// Returns true if this is an all-day value.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay { .. })
    }

    /// Returns the provider's rendering of this timestamp.
    pub fn rendered(&self) -> &str {
        match self {
            Self::Zoned { rendered, .. } | Self::AllDay { rendered, .. } => rendered,
        }
    }

    /// Returns the instant in UTC; all-day values map to midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Zoned { utc, .. } => *utc,
            Self::AllDay { date, .. } => {
                date.and_hms_opt(0, 0, 0).expect("valid time").and_utc()
            }
        }
    }
}

/// A raw calendar event from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The event title, if any.
    pub summary: Option<String>,

    /// When the event starts.
    pub start: RawEventTime,

    /// When the event ends.
    pub end: RawEventTime,

    /// The event location, if any.
    pub location: Option<String>,

    /// The event body, if any (may contain HTML).
    pub body: Option<String>,

    /// The calendar this event belongs to.
    pub calendar_id: String,
}

impl RawEvent {
    /// Creates a new raw event with the required fields.
    pub fn new(start: RawEventTime, end: RawEventTime, calendar_id: impl Into<String>) -> Self {
        Self {
            summary: None,
            start,
            end,
            location: None,
            body: None,
            calendar_id: calendar_id.into(),
        }
    }

    /// Returns the effective title, falling back to "(No title)" if empty.
    pub fn effective_summary(&self) -> &str {
        self.summary
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .unwrap_or(meetscan_core::NO_TITLE)
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}
