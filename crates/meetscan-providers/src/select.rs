//! Calendar scoping by display-name prefix.
//!
//! Providers with named sub-calendars (Google) are scoped by a
//! case-insensitive prefix match on the display name. Providers that
//! expose a fixed default set (Exchange) skip the filter entirely; their
//! listing already is the scope.

use tracing::debug;

use crate::provider::{CalendarRef, CalendarScope};

/// Keeps calendars whose display name starts with `prefix`, ignoring case.
pub fn filter_by_prefix(calendars: Vec<CalendarRef>, prefix: &str) -> Vec<CalendarRef> {
    let needle = prefix.to_lowercase();
    calendars
        .into_iter()
        .filter(|cal| cal.display_name.to_lowercase().starts_with(&needle))
        .collect()
}

/// Applies the provider's scope policy to its calendar listing.
///
/// An empty result is not an error; the scan simply yields no meetings.
pub fn select_calendars(
    calendars: Vec<CalendarRef>,
    scope: CalendarScope,
    prefix: &str,
) -> Vec<CalendarRef> {
    let selected = match scope {
        CalendarScope::NamePrefix => filter_by_prefix(calendars, prefix),
        CalendarScope::DefaultSet => calendars,
    };
    debug!(count = selected.len(), "calendars in scope");
    selected
}
