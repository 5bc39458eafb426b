//! SOAP envelopes and response parsing for EWS operations.
//!
//! Request bodies are built with a quick-xml writer; responses are walked
//! with an event reader matching on local element names, since servers
//! differ in their namespace prefixes.

use std::io::Cursor;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::raw_event::{RawEvent, RawEventTime};

/// SOAP envelope namespace.
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// EWS messages namespace.
pub const MESSAGES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";
/// EWS types namespace.
pub const TYPES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// The distinguished folder id of the account's default calendar.
pub const DEFAULT_CALENDAR_ID: &str = "calendar";

/// A calendar folder discovered via FindFolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFolder {
    /// The EWS folder id.
    pub id: String,
    /// The folder display name.
    pub display_name: String,
}

/// An EWS item id with its change key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId {
    /// The item id.
    pub id: String,
    /// The change key, when the server sent one.
    pub change_key: Option<String>,
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .expect("in-memory write");
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .expect("in-memory write");
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .expect("in-memory write");
}

/// Wraps an operation body in a SOAP envelope with the EWS namespaces.
fn envelope(build_body: impl FnOnce(&mut Writer<Cursor<Vec<u8>>>)) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut env = BytesStart::new("soap:Envelope");
    env.push_attribute(("xmlns:soap", SOAP_NS));
    env.push_attribute(("xmlns:m", MESSAGES_NS));
    env.push_attribute(("xmlns:t", TYPES_NS));
    writer.write_event(Event::Start(env)).expect("in-memory write");

    writer
        .write_event(Event::Start(BytesStart::new("soap:Header")))
        .expect("in-memory write");
    let mut version = BytesStart::new("t:RequestServerVersion");
    version.push_attribute(("Version", "Exchange2013"));
    writer
        .write_event(Event::Empty(version))
        .expect("in-memory write");
    writer
        .write_event(Event::End(BytesEnd::new("soap:Header")))
        .expect("in-memory write");

    writer
        .write_event(Event::Start(BytesStart::new("soap:Body")))
        .expect("in-memory write");
    build_body(&mut writer);
    writer
        .write_event(Event::End(BytesEnd::new("soap:Body")))
        .expect("in-memory write");

    writer
        .write_event(Event::End(BytesEnd::new("soap:Envelope")))
        .expect("in-memory write");

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).expect("writer produces UTF-8")
}

fn format_ews_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generates a FindFolder request for the default calendar's direct
/// sub-calendars.
pub fn find_folder_body() -> String {
    envelope(|writer| {
        let mut find = BytesStart::new("m:FindFolder");
        find.push_attribute(("Traversal", "Shallow"));
        writer.write_event(Event::Start(find)).expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:FolderShape")))
            .expect("in-memory write");
        write_text_element(writer, "t:BaseShape", "Default");
        writer
            .write_event(Event::End(BytesEnd::new("m:FolderShape")))
            .expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:ParentFolderIds")))
            .expect("in-memory write");
        let mut parent = BytesStart::new("t:DistinguishedFolderId");
        parent.push_attribute(("Id", DEFAULT_CALENDAR_ID));
        writer
            .write_event(Event::Empty(parent))
            .expect("in-memory write");
        writer
            .write_event(Event::End(BytesEnd::new("m:ParentFolderIds")))
            .expect("in-memory write");

        writer
            .write_event(Event::End(BytesEnd::new("m:FindFolder")))
            .expect("in-memory write");
    })
}

/// Generates a FindItem request returning the ids of calendar items whose
/// occurrence falls inside the window.
///
/// `CalendarView` makes the server expand recurrences into concrete
/// occurrences; only ids are requested here because FindItem cannot return
/// item bodies — a GetItem round-trip fetches the details.
pub fn find_item_body(folder_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    envelope(|writer| {
        let mut find = BytesStart::new("m:FindItem");
        find.push_attribute(("Traversal", "Shallow"));
        writer.write_event(Event::Start(find)).expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:ItemShape")))
            .expect("in-memory write");
        write_text_element(writer, "t:BaseShape", "IdOnly");
        writer
            .write_event(Event::End(BytesEnd::new("m:ItemShape")))
            .expect("in-memory write");

        let mut view = BytesStart::new("m:CalendarView");
        view.push_attribute(("StartDate", format_ews_datetime(start).as_str()));
        view.push_attribute(("EndDate", format_ews_datetime(end).as_str()));
        writer
            .write_event(Event::Empty(view))
            .expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:ParentFolderIds")))
            .expect("in-memory write");
        if folder_id == DEFAULT_CALENDAR_ID {
            let mut parent = BytesStart::new("t:DistinguishedFolderId");
            parent.push_attribute(("Id", DEFAULT_CALENDAR_ID));
            writer
                .write_event(Event::Empty(parent))
                .expect("in-memory write");
        } else {
            let mut parent = BytesStart::new("t:FolderId");
            parent.push_attribute(("Id", folder_id));
            writer
                .write_event(Event::Empty(parent))
                .expect("in-memory write");
        }
        writer
            .write_event(Event::End(BytesEnd::new("m:ParentFolderIds")))
            .expect("in-memory write");

        writer
            .write_event(Event::End(BytesEnd::new("m:FindItem")))
            .expect("in-memory write");
    })
}

/// Generates a GetItem request for the fields the scan needs, including
/// the HTML body.
pub fn get_item_body(items: &[ItemId]) -> String {
    envelope(|writer| {
        writer
            .write_event(Event::Start(BytesStart::new("m:GetItem")))
            .expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:ItemShape")))
            .expect("in-memory write");
        write_text_element(writer, "t:BaseShape", "IdOnly");
        write_text_element(writer, "t:BodyType", "HTML");
        writer
            .write_event(Event::Start(BytesStart::new("t:AdditionalProperties")))
            .expect("in-memory write");
        for field in [
            "item:Subject",
            "item:Body",
            "calendar:Start",
            "calendar:End",
            "calendar:IsAllDayEvent",
            "calendar:Location",
        ] {
            let mut uri = BytesStart::new("t:FieldURI");
            uri.push_attribute(("FieldURI", field));
            writer
                .write_event(Event::Empty(uri))
                .expect("in-memory write");
        }
        writer
            .write_event(Event::End(BytesEnd::new("t:AdditionalProperties")))
            .expect("in-memory write");
        writer
            .write_event(Event::End(BytesEnd::new("m:ItemShape")))
            .expect("in-memory write");

        writer
            .write_event(Event::Start(BytesStart::new("m:ItemIds")))
            .expect("in-memory write");
        for item in items {
            let mut id = BytesStart::new("t:ItemId");
            id.push_attribute(("Id", item.id.as_str()));
            if let Some(ref change_key) = item.change_key {
                id.push_attribute(("ChangeKey", change_key.as_str()));
            }
            writer.write_event(Event::Empty(id)).expect("in-memory write");
        }
        writer
            .write_event(Event::End(BytesEnd::new("m:ItemIds")))
            .expect("in-memory write");

        writer
            .write_event(Event::End(BytesEnd::new("m:GetItem")))
            .expect("in-memory write");
    })
}

/// Strips the namespace prefix from an element name.
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| String::from_utf8(attr.value.into_owned()).ok())
}

/// Scans a response for an error response message.
///
/// Returns the server's message text (or response code) when any response
/// message carries `ResponseClass="Error"`.
pub fn find_response_error(xml: &str) -> Option<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_error = false;
    let mut current_element: Option<String> = None;
    let mut message_text: Option<String> = None;
    let mut response_code: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if attribute(&e, "ResponseClass").as_deref() == Some("Error") {
                    in_error = true;
                }
                if in_error {
                    current_element = Some(local_name(&name).to_string());
                }
            }
            Ok(Event::End(_)) => {
                current_element = None;
            }
            Ok(Event::Text(e)) => {
                if let Some(ref elem) = current_element {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match elem.as_str() {
                        "MessageText" => message_text = Some(text),
                        "ResponseCode" => response_code = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if in_error {
        message_text
            .or(response_code)
            .or_else(|| Some("unspecified EWS error".to_string()))
    } else {
        None
    }
}

/// Parses a FindFolder response into the discovered calendar folders.
pub fn parse_find_folder_response(xml: &str) -> Vec<DiscoveredFolder> {
    let mut folders = Vec::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_folder = false;
    let mut current_id: Option<String> = None;
    let mut current_name: Option<String> = None;
    let mut current_element: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = local_name(&name);

                match local {
                    "CalendarFolder" | "Folder" => {
                        in_folder = true;
                        current_id = None;
                        current_name = None;
                    }
                    "FolderId" if in_folder => {
                        current_id = attribute(&e, "Id");
                    }
                    "DisplayName" if in_folder => {
                        current_element = Some(local.to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = local_name(&name);

                if matches!(local, "CalendarFolder" | "Folder") && in_folder {
                    if let Some(id) = current_id.take() {
                        folders.push(DiscoveredFolder {
                            id,
                            display_name: current_name.take().unwrap_or_default(),
                        });
                    }
                    in_folder = false;
                }
                current_element = None;
            }
            Ok(Event::Text(e)) => {
                if current_element.as_deref() == Some("DisplayName") {
                    current_name = Some(e.unescape().unwrap_or_default().to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    folders
}

/// Parses a FindItem response into the matched item ids.
pub fn parse_find_item_response(xml: &str) -> Vec<ItemId> {
    let mut items = Vec::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if local_name(&name) == "ItemId" {
                    if let Some(id) = attribute(&e, "Id") {
                        items.push(ItemId {
                            id,
                            change_key: attribute(&e, "ChangeKey"),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    items
}

/// Parses a GetItem response into raw events for `calendar_id`.
///
/// Items with unparseable times are dropped. All-day items keep their wire
/// start/end renderings but are marked as date-only values.
pub fn parse_get_item_response(xml: &str, calendar_id: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_item = false;
    let mut subject: Option<String> = None;
    let mut body: Option<String> = None;
    let mut location: Option<String> = None;
    let mut start: Option<String> = None;
    let mut end: Option<String> = None;
    let mut all_day = false;
    let mut current_element: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = local_name(&name);

                match local {
                    "CalendarItem" => {
                        in_item = true;
                        subject = None;
                        body = None;
                        location = None;
                        start = None;
                        end = None;
                        all_day = false;
                    }
                    "Subject" | "Body" | "Location" | "Start" | "End" | "IsAllDayEvent"
                        if in_item =>
                    {
                        current_element = Some(local.to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if local_name(&name) == "CalendarItem" && in_item {
                    if let Some(event) = build_event(
                        subject.take(),
                        body.take(),
                        location.take(),
                        start.take(),
                        end.take(),
                        all_day,
                        calendar_id,
                    ) {
                        events.push(event);
                    }
                    in_item = false;
                }
                current_element = None;
            }
            Ok(Event::Text(e)) => {
                if let Some(ref elem) = current_element {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match elem.as_str() {
                        "Subject" => subject = Some(text),
                        "Body" => body = Some(text),
                        "Location" => location = Some(text),
                        "Start" => start = Some(text),
                        "End" => end = Some(text),
                        "IsAllDayEvent" => all_day = text == "true",
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    events
}

fn build_event(
    subject: Option<String>,
    body: Option<String>,
    location: Option<String>,
    start: Option<String>,
    end: Option<String>,
    all_day: bool,
    calendar_id: &str,
) -> Option<RawEvent> {
    let start = parse_ews_time(start?.as_str(), all_day)?;
    let end = parse_ews_time(end?.as_str(), all_day)?;

    let mut event = RawEvent::new(start, end, calendar_id);
    event.summary = subject;
    event.body = body;
    event.location = location;
    Some(event)
}

/// Parses an EWS timestamp, preserving the wire rendering.
fn parse_ews_time(wire: &str, all_day: bool) -> Option<RawEventTime> {
    let parsed = DateTime::parse_from_rfc3339(wire)
        .map_err(|e| tracing::warn!("failed to parse EWS time {}: {}", wire, e))
        .ok()?;
    let utc = parsed.with_timezone(&Utc);

    if all_day {
        Some(RawEventTime::AllDay {
            date: utc.date_naive(),
            rendered: wire.to_string(),
        })
    } else {
        Some(RawEventTime::from_wire(utc, wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
        )
    }

    mod request_bodies {
        use super::*;

        #[test]
        fn find_folder_targets_the_default_calendar() {
            let body = find_folder_body();
            assert!(body.contains("m:FindFolder"));
            assert!(body.contains(r#"Traversal="Shallow""#));
            assert!(body.contains(r#"t:DistinguishedFolderId Id="calendar""#));
            assert!(body.contains(MESSAGES_NS));
        }

        #[test]
        fn find_item_uses_a_calendar_view_over_the_window() {
            let (start, end) = window_bounds();
            let body = find_item_body("AAMkFolder", start, end);
            assert!(body.contains(r#"StartDate="2024-01-01T11:00:00Z""#));
            assert!(body.contains(r#"EndDate="2024-01-01T20:00:00Z""#));
            assert!(body.contains(r#"t:FolderId Id="AAMkFolder""#));
            assert!(body.contains("IdOnly"));
        }

        #[test]
        fn find_item_on_the_default_calendar_uses_the_distinguished_id() {
            let (start, end) = window_bounds();
            let body = find_item_body(DEFAULT_CALENDAR_ID, start, end);
            assert!(body.contains(r#"t:DistinguishedFolderId Id="calendar""#));
        }

        #[test]
        fn get_item_requests_the_html_body() {
            let items = vec![
                ItemId {
                    id: "AAMk1".to_string(),
                    change_key: Some("CQAA".to_string()),
                },
                ItemId {
                    id: "AAMk2".to_string(),
                    change_key: None,
                },
            ];
            let body = get_item_body(&items);
            assert!(body.contains("m:GetItem"));
            assert!(body.contains("<t:BodyType>HTML</t:BodyType>"));
            assert!(body.contains(r#"FieldURI="item:Body""#));
            assert!(body.contains(r#"t:ItemId Id="AAMk1" ChangeKey="CQAA""#));
            assert!(body.contains(r#"t:ItemId Id="AAMk2""#));
        }
    }

    mod responses {
        use super::*;

        const FIND_FOLDER_RESPONSE: &str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
              <s:Body>
                <m:FindFolderResponse
                    xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                    xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
                  <m:ResponseMessages>
                    <m:FindFolderResponseMessage ResponseClass="Success">
                      <m:RootFolder TotalItemsInView="2" IncludesLastItemInRange="true">
                        <t:Folders>
                          <t:CalendarFolder>
                            <t:FolderId Id="AAMkTeam" ChangeKey="AQAA"/>
                            <t:DisplayName>Team events</t:DisplayName>
                          </t:CalendarFolder>
                          <t:CalendarFolder>
                            <t:FolderId Id="AAMkOncall" ChangeKey="AQAB"/>
                            <t:DisplayName>Oncall</t:DisplayName>
                          </t:CalendarFolder>
                        </t:Folders>
                      </m:RootFolder>
                    </m:FindFolderResponseMessage>
                  </m:ResponseMessages>
                </m:FindFolderResponse>
              </s:Body>
            </s:Envelope>"#;

        #[test]
        fn parses_discovered_folders() {
            let folders = parse_find_folder_response(FIND_FOLDER_RESPONSE);
            assert_eq!(
                folders,
                vec![
                    DiscoveredFolder {
                        id: "AAMkTeam".to_string(),
                        display_name: "Team events".to_string(),
                    },
                    DiscoveredFolder {
                        id: "AAMkOncall".to_string(),
                        display_name: "Oncall".to_string(),
                    },
                ]
            );
        }

        #[test]
        fn parses_item_ids() {
            let xml = r#"
                <m:FindItemResponse xmlns:m="ns-m" xmlns:t="ns-t">
                  <t:CalendarItem>
                    <t:ItemId Id="AAMk1" ChangeKey="CQAA"/>
                  </t:CalendarItem>
                  <t:CalendarItem>
                    <t:ItemId Id="AAMk2"/>
                  </t:CalendarItem>
                </m:FindItemResponse>"#;

            let items = parse_find_item_response(xml);
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].id, "AAMk1");
            assert_eq!(items[0].change_key, Some("CQAA".to_string()));
            assert_eq!(items[1].change_key, None);
        }

        #[test]
        fn parses_calendar_items() {
            let xml = r#"
                <m:GetItemResponse xmlns:m="ns-m" xmlns:t="ns-t">
                  <t:CalendarItem>
                    <t:ItemId Id="AAMk1"/>
                    <t:Subject>Planning</t:Subject>
                    <t:Body BodyType="HTML">&lt;a href="https://zoom.us/j/5"&gt;join&lt;/a&gt;</t:Body>
                    <t:Start>2024-01-01T11:30:00Z</t:Start>
                    <t:End>2024-01-01T12:00:00Z</t:End>
                    <t:IsAllDayEvent>false</t:IsAllDayEvent>
                    <t:Location>Room 1</t:Location>
                  </t:CalendarItem>
                </m:GetItemResponse>"#;

            let events = parse_get_item_response(xml, "AAMkTeam");
            assert_eq!(events.len(), 1);

            let event = &events[0];
            assert_eq!(event.effective_summary(), "Planning");
            assert_eq!(event.location, Some("Room 1".to_string()));
            assert_eq!(
                event.body,
                Some(r#"<a href="https://zoom.us/j/5">join</a>"#.to_string())
            );
            assert_eq!(event.start.rendered(), "2024-01-01T11:30:00Z");
            assert_eq!(event.calendar_id, "AAMkTeam");
            assert!(!event.is_all_day());
        }

        #[test]
        fn all_day_items_become_date_values() {
            let xml = r#"
                <m:GetItemResponse xmlns:m="ns-m" xmlns:t="ns-t">
                  <t:CalendarItem>
                    <t:Subject>Offsite</t:Subject>
                    <t:Start>2024-01-01T00:00:00Z</t:Start>
                    <t:End>2024-01-02T00:00:00Z</t:End>
                    <t:IsAllDayEvent>true</t:IsAllDayEvent>
                  </t:CalendarItem>
                </m:GetItemResponse>"#;

            let events = parse_get_item_response(xml, "calendar");
            assert_eq!(events.len(), 1);
            assert!(events[0].is_all_day());
            assert_eq!(events[0].start.rendered(), "2024-01-01T00:00:00Z");
        }

        #[test]
        fn items_with_broken_times_are_dropped() {
            let xml = r#"
                <m:GetItemResponse xmlns:m="ns-m" xmlns:t="ns-t">
                  <t:CalendarItem>
                    <t:Subject>Broken</t:Subject>
                    <t:Start>tomorrow-ish</t:Start>
                    <t:End>2024-01-01T12:00:00Z</t:End>
                  </t:CalendarItem>
                </m:GetItemResponse>"#;

            assert!(parse_get_item_response(xml, "calendar").is_empty());
        }

        #[test]
        fn detects_error_response_messages() {
            let xml = r#"
                <m:FindFolderResponse xmlns:m="ns-m">
                  <m:ResponseMessages>
                    <m:FindFolderResponseMessage ResponseClass="Error">
                      <m:MessageText>The specified folder could not be found.</m:MessageText>
                      <m:ResponseCode>ErrorFolderNotFound</m:ResponseCode>
                    </m:FindFolderResponseMessage>
                  </m:ResponseMessages>
                </m:FindFolderResponse>"#;

            let error = find_response_error(xml).unwrap();
            assert!(error.contains("could not be found"));
        }

        #[test]
        fn success_responses_carry_no_error() {
            assert!(find_response_error(FIND_FOLDER_RESPONSE).is_none());
        }
    }
}
