//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the abstraction the
//! scan drives: a backend exposes its calendars and the events of one
//! calendar inside a time window. The two implementations (Google,
//! Exchange) also declare their scoping and link-search policies here,
//! because the backends genuinely differ in both and the scan needs to
//! know which rules apply without branching on the concrete type.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use meetscan_core::{BodyFallback, TimeWindow};

use crate::error::ProviderResult;
use crate::raw_event::RawEvent;

/// The backend a calendar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Calendar.
    Google,
    /// Microsoft Exchange (EWS).
    Exchange,
}

/// A scannable calendar exposed by a provider account.
///
/// Created when listing an account's calendars, used to address event
/// queries, and discarded after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRef {
    /// Provider-specific calendar identifier.
    pub id: String,
    /// Human-readable name, used for prefix scoping.
    pub display_name: String,
    /// The backend this calendar belongs to.
    pub provider: ProviderKind,
}

impl CalendarRef {
    /// Creates a new calendar reference.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider,
        }
    }
}

/// How a provider's calendars are brought into scope for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarScope {
    /// Keep calendars whose display name starts with the configured prefix.
    NamePrefix,
    /// The provider's calendar listing already IS the scope; the prefix
    /// filter is not applied. Used by Exchange, where the scope is the
    /// account's default calendar plus its direct sub-calendars.
    DefaultSet,
}

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe, which the scan needs to drive any
/// backend through `&dyn CalendarProvider`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The abstraction for calendar backends.
///
/// Implementations handle their own authentication and transport; the scan
/// only ever sees calendars and raw events. Both listing methods may fail
/// with a [`ProviderError`](crate::error::ProviderError), which aborts the
/// run.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name of this provider (e.g., "google", "exchange").
    fn name(&self) -> &str;

    /// Returns the backend kind.
    fn kind(&self) -> ProviderKind;

    /// Returns how this provider's calendars are scoped.
    fn calendar_scope(&self) -> CalendarScope;

    /// Returns whether event bodies are scanned for join links when the
    /// location check fails.
    fn body_fallback(&self) -> BodyFallback;

    /// Lists the calendars the scan may consider.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarRef>>>;

    /// Lists the events of one calendar whose start falls inside the window.
    ///
    /// The window is pushed down to the backend query; callers trust the
    /// backend's range semantics and do not re-filter.
    fn list_events<'a>(
        &'a self,
        calendar: &'a CalendarRef,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_ref_creation() {
        let cal = CalendarRef::new("cal-123", "work: Eng", ProviderKind::Google);
        assert_eq!(cal.id, "cal-123");
        assert_eq!(cal.display_name, "work: Eng");
        assert_eq!(cal.provider, ProviderKind::Google);
    }

    #[test]
    fn calendar_ref_serde_roundtrip() {
        let cal = CalendarRef::new("calendar", "Calendar", ProviderKind::Exchange);
        let json = serde_json::to_string(&cal).unwrap();
        let parsed: CalendarRef = serde_json::from_str(&json).unwrap();
        assert_eq!(cal, parsed);
    }
}
