//! Exchange (EWS) calendar provider implementation.

use tracing::{debug, info};

use meetscan_core::{BodyFallback, TimeWindow};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, CalendarRef, CalendarScope, ProviderKind};
use crate::raw_event::RawEvent;

use super::client::ExchangeClient;
use super::config::ExchangeConfig;
use super::soap::{
    DEFAULT_CALENDAR_ID, find_folder_body, find_item_body, find_response_error, get_item_body,
    parse_find_folder_response, parse_find_item_response, parse_get_item_response,
};

/// Exchange calendar provider.
///
/// Scope policy: the account's default calendar plus its direct
/// sub-calendars, with no name filtering. Link policy: the location check
/// first, then a scan of the HTML body for Teams/Zoom join hrefs.
#[derive(Debug)]
pub struct ExchangeProvider {
    client: ExchangeClient,
}

impl ExchangeProvider {
    /// Creates a provider from configuration.
    pub fn new(config: ExchangeConfig) -> ProviderResult<Self> {
        if config.username.is_empty() || config.password.is_empty() {
            return Err(ProviderError::configuration(
                "exchange requires a username and a password",
            )
            .with_provider("exchange"));
        }

        let client = ExchangeClient::new(config).map_err(|e| e.with_provider("exchange"))?;
        Ok(Self { client })
    }

    /// Posts a SOAP envelope and surfaces EWS response-level errors.
    async fn call(&self, body: &str) -> ProviderResult<String> {
        let response = self
            .client
            .post_soap(body)
            .await
            .map_err(|e| e.with_provider("exchange"))?;

        if let Some(message) = find_response_error(&response) {
            return Err(ProviderError::calendar(message).with_provider("exchange"));
        }
        Ok(response)
    }
}

impl CalendarProvider for ExchangeProvider {
    fn name(&self) -> &str {
        "exchange"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Exchange
    }

    fn calendar_scope(&self) -> CalendarScope {
        CalendarScope::DefaultSet
    }

    fn body_fallback(&self) -> BodyFallback {
        BodyFallback::HrefScan
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarRef>>> {
        Box::pin(async move {
            let response = self.call(&find_folder_body()).await?;
            let folders = parse_find_folder_response(&response);

            // Sub-calendars first, then the default calendar itself.
            let mut calendars: Vec<CalendarRef> = folders
                .into_iter()
                .map(|folder| {
                    CalendarRef::new(folder.id, folder.display_name, ProviderKind::Exchange)
                })
                .collect();
            calendars.push(CalendarRef::new(
                DEFAULT_CALENDAR_ID,
                "Calendar",
                ProviderKind::Exchange,
            ));

            info!(count = calendars.len(), "listed exchange calendars");
            Ok(calendars)
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar: &'a CalendarRef,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            let response = self
                .call(&find_item_body(&calendar.id, window.start, window.end))
                .await?;
            let item_ids = parse_find_item_response(&response);

            if item_ids.is_empty() {
                debug!(calendar = %calendar.display_name, "no items in window");
                return Ok(Vec::new());
            }

            // FindItem cannot return item bodies; fetch the details in a
            // second round-trip.
            let response = self.call(&get_item_body(&item_ids)).await?;
            let events = parse_get_item_response(&response, &calendar.id);

            debug!(
                calendar = %calendar.display_name,
                count = events.len(),
                "fetched exchange events"
            );
            Ok(events)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_credentials() {
        let err = ExchangeProvider::new(ExchangeConfig::new("", "")).unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
        assert_eq!(err.provider(), Some("exchange"));
    }

    #[test]
    fn declares_exchange_policies() {
        let provider =
            ExchangeProvider::new(ExchangeConfig::new("jdoe@example.com", "hunter2")).unwrap();
        assert_eq!(provider.name(), "exchange");
        assert_eq!(provider.kind(), ProviderKind::Exchange);
        assert_eq!(provider.calendar_scope(), CalendarScope::DefaultSet);
        assert_eq!(provider.body_fallback(), BodyFallback::HrefScan);
    }
}
