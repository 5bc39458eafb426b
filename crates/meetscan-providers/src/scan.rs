//! The scan pipeline: select calendars, fetch events, match links,
//! normalize.
//!
//! A scan is a single sequential pass over one provider account: calendars
//! are processed one at a time in listing order, each calendar's events in
//! the order the backend returned them. The first adapter error aborts the
//! whole run; no partial results are emitted. Events without a recognized
//! conferencing link are skipped silently. Nothing is de-duplicated across
//! calendars.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use meetscan_core::{LinkKind, LinkMatcher, LinkSource, NormalizedMeeting, TimeWindow};

use crate::error::ProviderResult;
use crate::normalize::{DayBounds, normalize_event};
use crate::provider::CalendarProvider;
use crate::select::select_calendars;

/// Options for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Display-name prefix for calendar scoping (where the provider's
    /// scope policy applies it).
    pub calendar_filter: String,
    /// Include meetings that started up to this many hours ago.
    pub hours_before: u32,
    /// Include meetings starting up to this many hours from now.
    pub hours_after: u32,
    /// Narrow the location needle to `zoom.us` (an actual URL) instead of
    /// `zoom`.
    pub only_with_url: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            calendar_filter: "work: ".to_string(),
            hours_before: 1,
            hours_after: 8,
            only_with_url: false,
        }
    }
}

/// Runs a full scan against one provider account.
///
/// Returns the accepted meetings in scan order. An empty scope, an empty
/// window, or a run where no event carries a link all yield `Ok` with an
/// empty (or shorter) list; only adapter failures are errors.
pub async fn scan(
    provider: &dyn CalendarProvider,
    options: &ScanOptions,
    now: DateTime<Utc>,
) -> ProviderResult<Vec<NormalizedMeeting>> {
    let window = TimeWindow::around(now, options.hours_before, options.hours_after);
    let day = DayBounds::for_run(now);
    let matcher = LinkMatcher::new(options.only_with_url, provider.body_fallback());

    let calendars = provider.list_calendars().await?;
    let selected = select_calendars(calendars, provider.calendar_scope(), &options.calendar_filter);

    let mut meetings = Vec::new();
    for calendar in &selected {
        info!(calendar = %calendar.display_name, "processing calendar");
        let events = provider.list_events(calendar, &window).await?;

        for event in &events {
            debug!(
                subject = %event.effective_summary(),
                start = %event.start.rendered(),
                end = %event.end.rendered(),
                "processing event"
            );

            let Some(link) = matcher.match_event(event.location.as_deref(), event.body.as_deref())
            else {
                continue;
            };

            if link.source == LinkSource::Body {
                match link.kind {
                    LinkKind::Teams => {
                        info!(url = %link.url, "found an MS Teams meeting in the body");
                    }
                    LinkKind::Zoom => {
                        info!(url = %link.url, "found a Zoom meeting in the body");
                    }
                }
            }

            meetings.push(normalize_event(event, &link, &day));
        }
    }

    Ok(meetings)
}
