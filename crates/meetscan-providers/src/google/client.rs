//! Google Calendar API client.
//!
//! A low-level HTTP client for the Calendar API v3: request building,
//! response decoding, and the mapping from API payloads to [`RawEvent`].

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use meetscan_core::TimeWindow;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventTime};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Creates a new client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
        })
    }

    /// Lists the account's calendars.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", CALENDAR_API_BASE);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = check_status(response).await?;

        let list: CalendarListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse calendar list: {}", e))
        })?;

        debug!(count = list.items.len(), "fetched calendar list");
        Ok(list.items)
    }

    /// Lists a calendar's events with a start inside the window.
    ///
    /// Recurring events are expanded server-side (`singleEvents=true`) and
    /// pages are followed until exhausted.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<RawEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", window.start.to_rfc3339()),
                    ("timeMax", window.end.to_rfc3339()),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(map_transport_error)?;
            let body = check_status(response).await?;

            let page: EventListResponse = serde_json::from_str(&body).map_err(|e| {
                ProviderError::invalid_response(format!("failed to parse event list: {}", e))
            })?;

            for event in page.items {
                if let Some(raw) = convert_event(event, calendar_id) {
                    all_events.push(raw);
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            count = all_events.len(),
            calendar = %calendar_id,
            "fetched events"
        );
        Ok(all_events)
    }
}

/// Maps reqwest transport failures to provider errors.
fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Maps the response status and returns the body of successful responses.
async fn check_status(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProviderError::authentication(
            "access token expired or invalid",
        ));
    }
    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::authorization("access denied to calendar"));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::not_found("calendar not found"));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::rate_limited("rate limit exceeded"));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::server(format!(
            "API error ({}): {}",
            status, body
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
}

/// Converts an API event to a [`RawEvent`].
///
/// Cancelled events and events with unparseable times are dropped.
fn convert_event(event: ApiEvent, calendar_id: &str) -> Option<RawEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let start = convert_event_time(&event.start)?;
    let end = convert_event_time(&event.end)?;

    let mut raw = RawEvent::new(start, end, calendar_id);
    raw.summary = event.summary;
    raw.location = event.location;
    raw.body = event.description;
    Some(raw)
}

/// Converts an API event time, preserving the wire rendering.
fn convert_event_time(time: &ApiEventTime) -> Option<RawEventTime> {
    match (&time.date_time, &time.date) {
        (Some(dt), _) => {
            let parsed = DateTime::parse_from_rfc3339(dt)
                .map_err(|e| warn!("failed to parse event time {}: {}", dt, e))
                .ok()?;
            Some(RawEventTime::from_wire(
                parsed.with_timezone(&chrono::Utc),
                dt,
            ))
        }
        (None, Some(date)) => {
            let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| warn!("failed to parse event date {}: {}", date, e))
                .ok()?;
            Some(RawEventTime::from_date(parsed))
        }
        (None, None) => {
            warn!("event has no start or end time");
            None
        }
    }
}

/// Response from the calendarList endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

/// A calendar from the calendarList endpoint.
///
/// The name exposed for scoping is `summaryOverride` (the user's own label
/// for the calendar); entries without one carry no usable name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// The calendar identifier.
    pub id: String,
    /// The user's override label for the calendar.
    pub summary_override: Option<String>,
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: ApiEventTime,
    end: ApiEventTime,
    status: Option<String>,
}

/// Event time from the API: either a zoned datetime or a date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_calendar_list() {
        let json = r#"{
            "items": [
                {"id": "primary", "summary": "me@example.com"},
                {"id": "cal-2", "summary": "Team", "summaryOverride": "work: Team"}
            ]
        }"#;

        let list: CalendarListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].summary_override, None);
        assert_eq!(
            list.items[1].summary_override,
            Some("work: Team".to_string())
        );
    }

    #[test]
    fn decodes_event_page_and_converts() {
        let json = r#"{
            "items": [
                {
                    "summary": "Standup",
                    "location": "https://zoom.us/j/123",
                    "start": {"dateTime": "2024-01-01T11:30:00+01:00"},
                    "end": {"dateTime": "2024-01-01T12:00:00+01:00"},
                    "status": "confirmed"
                },
                {
                    "summary": "Cancelled one",
                    "start": {"dateTime": "2024-01-01T13:00:00+01:00"},
                    "end": {"dateTime": "2024-01-01T14:00:00+01:00"},
                    "status": "cancelled"
                }
            ],
            "nextPageToken": "page-2"
        }"#;

        let page: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token, Some("page-2".to_string()));

        let events: Vec<_> = page
            .items
            .into_iter()
            .filter_map(|e| convert_event(e, "cal-1"))
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].effective_summary(), "Standup");
        assert_eq!(events[0].start.rendered(), "2024-01-01T11:30:00+01:00");
        assert_eq!(events[0].calendar_id, "cal-1");
        assert!(!events[0].is_all_day());
    }

    #[test]
    fn converts_all_day_event() {
        let json = r#"{
            "summary": "Hackday",
            "start": {"date": "2024-01-01"},
            "end": {"date": "2024-01-02"}
        }"#;

        let event: ApiEvent = serde_json::from_str(json).unwrap();
        let raw = convert_event(event, "cal-1").unwrap();
        assert!(raw.is_all_day());
        assert_eq!(raw.start.rendered(), "2024-01-01");
        assert_eq!(raw.end.rendered(), "2024-01-02");
    }

    #[test]
    fn drops_event_with_unparseable_time() {
        let json = r#"{
            "summary": "Broken",
            "start": {"dateTime": "not-a-time"},
            "end": {"dateTime": "2024-01-01T14:00:00+01:00"}
        }"#;

        let event: ApiEvent = serde_json::from_str(json).unwrap();
        assert!(convert_event(event, "cal-1").is_none());
    }

    #[test]
    fn maps_description_to_body() {
        let json = r#"{
            "summary": "Planning",
            "description": "<a href=\"https://zoom.us/j/5\">join</a>",
            "start": {"dateTime": "2024-01-01T14:00:00Z"},
            "end": {"dateTime": "2024-01-01T15:00:00Z"}
        }"#;

        let event: ApiEvent = serde_json::from_str(json).unwrap();
        let raw = convert_event(event, "cal-1").unwrap();
        assert!(raw.body.as_deref().unwrap().contains("zoom.us/j/5"));
    }
}
