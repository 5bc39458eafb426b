//! Conferencing-link detection for calendar events.
//!
//! An event counts as a conferencing meeting when either its location names a
//! Zoom meeting, or (for backends that expose event bodies) its HTML body
//! embeds a Teams or Zoom join link. The location test is a plain substring
//! check; the body scan looks for `href` attributes with known join URLs.
//!
//! # Example
//!
//! ```
//! use meetscan_core::links::{BodyFallback, LinkKind, LinkMatcher};
//!
//! let matcher = LinkMatcher::new(true, BodyFallback::Disabled);
//! let link = matcher
//!     .match_event(Some("https://zoom.us/j/123456789"), None)
//!     .unwrap();
//! assert_eq!(link.kind, LinkKind::Zoom);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Regex for a Microsoft Teams meetup-join URL inside an href attribute.
static TEAMS_HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="(?P<url>https://teams\.microsoft\.com/l/meetup-join[^"]+)""#)
        .expect("Invalid Teams href regex")
});

/// Regex for a Zoom join URL inside an href attribute.
static ZOOM_HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="(?P<url>https://zoom\.us/j/[^"]+)""#).expect("Invalid Zoom href regex")
});

/// The conferencing service a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// A Zoom meeting.
    Zoom,
    /// A Microsoft Teams meeting.
    Teams,
}

/// Where a link was found on the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    /// The event's location field.
    Location,
    /// The event's (HTML) body.
    Body,
}

/// A conferencing link extracted from an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferencingLink {
    /// The join URL. For location matches this is the whole location text.
    pub url: String,
    /// Which event field the link came from.
    pub source: LinkSource,
    /// The conferencing service.
    pub kind: LinkKind,
}

impl ConferencingLink {
    fn from_location(text: &str) -> Self {
        Self {
            url: text.to_string(),
            source: LinkSource::Location,
            kind: LinkKind::Zoom,
        }
    }

    fn from_body(url: &str, kind: LinkKind) -> Self {
        Self {
            url: url.to_string(),
            source: LinkSource::Body,
            kind,
        }
    }
}

/// Whether event bodies are scanned when the location check fails.
///
/// Backends differ here: the Google path only ever looks at the location,
/// while the Exchange path falls back to scanning the HTML body for join
/// hrefs. The asymmetry is carried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFallback {
    /// Location check only; a failed location check rejects the event.
    Disabled,
    /// Scan the body for Teams/Zoom hrefs when the location check fails.
    HrefScan,
}

/// Decides whether an event carries a usable conferencing link.
#[derive(Debug, Clone, Copy)]
pub struct LinkMatcher {
    only_with_url: bool,
    body_fallback: BodyFallback,
}

impl LinkMatcher {
    /// Creates a matcher.
    ///
    /// `only_with_url` narrows the location needle from `zoom` to `zoom.us`,
    /// so that only locations carrying an actual URL pass. It has no effect
    /// on the body scan.
    pub fn new(only_with_url: bool, body_fallback: BodyFallback) -> Self {
        Self {
            only_with_url,
            body_fallback,
        }
    }

    /// The substring a location must contain to count as a Zoom meeting.
    pub fn location_needle(&self) -> &'static str {
        if self.only_with_url { "zoom.us" } else { "zoom" }
    }

    /// Runs the location check, then the body fallback if enabled.
    ///
    /// Returns `None` when the event has no recognizable conferencing link.
    pub fn match_event(
        &self,
        location: Option<&str>,
        body: Option<&str>,
    ) -> Option<ConferencingLink> {
        if let Some(link) = self.match_location(location) {
            return Some(link);
        }

        match self.body_fallback {
            BodyFallback::Disabled => None,
            BodyFallback::HrefScan => match_body(body),
        }
    }

    /// Checks whether the location text names a Zoom meeting.
    ///
    /// A non-empty location whose lowercase form contains the needle is
    /// accepted wholesale: the full location text becomes the link URL.
    pub fn match_location(&self, location: Option<&str>) -> Option<ConferencingLink> {
        let text = location?;
        if text.is_empty() {
            return None;
        }
        if text.to_lowercase().contains(self.location_needle()) {
            Some(ConferencingLink::from_location(text))
        } else {
            None
        }
    }
}

/// Scans an HTML body for a Teams or Zoom join href.
///
/// CRLF sequences are stripped first so that hrefs wrapped across encoded
/// lines still match. Teams is checked before Zoom; a Teams match wins even
/// when a Zoom href appears earlier in the text.
pub fn match_body(body: Option<&str>) -> Option<ConferencingLink> {
    let body = body?;
    if body.is_empty() {
        return None;
    }
    let body = body.replace("\r\n", "");

    if let Some(caps) = TEAMS_HREF_REGEX.captures(&body) {
        return Some(ConferencingLink::from_body(&caps["url"], LinkKind::Teams));
    }
    if let Some(caps) = ZOOM_HREF_REGEX.captures(&body) {
        return Some(ConferencingLink::from_body(&caps["url"], LinkKind::Zoom));
    }
    None
}
