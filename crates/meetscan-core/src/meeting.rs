//! The normalized meeting record emitted by a scan.

use serde::{Deserialize, Serialize};

/// Fallback title for events without a summary.
pub const NO_TITLE: &str = "(No title)";

/// A provider-agnostic meeting with a usable conferencing link.
///
/// This is the output entity of a scan: one record per accepted event,
/// serialized as a JSON object with four string fields. `start` and `end`
/// carry the provider's native timestamp rendering, except for all-day
/// events which receive the run-day bounds computed by the normalizer.
/// `location` always holds the conferencing link that made the event
/// count as a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMeeting {
    /// The event title.
    pub summary: String,
    /// Rendered start timestamp.
    pub start: String,
    /// Rendered end timestamp.
    pub end: String,
    /// The conferencing link.
    pub location: String,
}

impl NormalizedMeeting {
    /// Creates a new meeting record.
    pub fn new(
        summary: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            start: start.into(),
            end: end.into(),
            location: location.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_string_object() {
        let meeting = NormalizedMeeting::new(
            "Standup",
            "2024-01-01 11:30:00+00:00",
            "2024-01-01 12:00:00+00:00",
            "https://zoom.us/j/123",
        );

        let json = serde_json::to_value(&meeting).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "summary": "Standup",
                "start": "2024-01-01 11:30:00+00:00",
                "end": "2024-01-01 12:00:00+00:00",
                "location": "https://zoom.us/j/123",
            })
        );
    }

    #[test]
    fn serde_roundtrip() {
        let meeting = NormalizedMeeting::new("A", "B", "C", "D");
        let json = serde_json::to_string(&meeting).unwrap();
        let parsed: NormalizedMeeting = serde_json::from_str(&json).unwrap();
        assert_eq!(meeting, parsed);
    }
}
