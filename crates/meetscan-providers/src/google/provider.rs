//! Google Calendar provider implementation.

use tracing::debug;

use meetscan_core::{BodyFallback, TimeWindow};

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, CalendarProvider, CalendarRef, CalendarScope, ProviderKind};
use crate::raw_event::RawEvent;

use super::client::GoogleCalendarClient;
use super::config::{GoogleConfig, GoogleCredentials};

/// Google Calendar provider.
///
/// Scope policy: calendars are selected by display-name prefix, where the
/// display name is the list entry's `summaryOverride`. Link policy: the
/// location check only; event bodies are never scanned.
pub struct GoogleProvider {
    client: GoogleCalendarClient,
}

impl GoogleProvider {
    /// Creates a provider from configuration.
    ///
    /// Reads the access token from the configured credentials file.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        let credentials = GoogleCredentials::from_file(&config.credentials_path)
            .map_err(|e| e.with_provider("google"))?;
        let client = GoogleCalendarClient::new(credentials.access_token, config.timeout)
            .map_err(|e| e.with_provider("google"))?;
        Ok(Self { client })
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn calendar_scope(&self) -> CalendarScope {
        CalendarScope::NamePrefix
    }

    fn body_fallback(&self) -> BodyFallback {
        BodyFallback::Disabled
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarRef>>> {
        Box::pin(async move {
            let entries = self
                .client
                .list_calendars()
                .await
                .map_err(|e| e.with_provider("google"))?;

            let calendars = entries
                .into_iter()
                .map(|entry| {
                    // Entries without an override label keep an empty name,
                    // which never matches a non-empty prefix.
                    let name = entry.summary_override.unwrap_or_default();
                    CalendarRef::new(entry.id, name, ProviderKind::Google)
                })
                .collect::<Vec<_>>();

            debug!(count = calendars.len(), "listed google calendars");
            Ok(calendars)
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar: &'a CalendarRef,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            self.client
                .list_events(&calendar.id, window)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}
