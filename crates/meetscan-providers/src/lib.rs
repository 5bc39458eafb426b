//! CalendarProvider trait and implementations.
//!
//! This crate provides the backend abstraction and the scan pipeline:
//!
//! - [`CalendarProvider`] - The trait calendar backends implement
//! - [`RawEvent`] - Provider-agnostic raw event data
//! - [`scan`] - The pipeline from calendars to normalized meetings
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │ Google Calendar │    │  EWS endpoint   │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌──────────────────┐
//! │ GoogleProvider  │    │ ExchangeProvider │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          │   CalendarProvider   │
//!          └──────────┬───────────┘
//!                     │
//!                     ▼ scan()
//!          select calendars → fetch events
//!            → match links → normalize
//!                     │
//!                     ▼
//!          ┌───────────────────────┐
//!          │ Vec<NormalizedMeeting>│
//!          └───────────────────────┘
//! ```

pub mod error;
pub mod exchange;
pub mod google;
pub mod normalize;
pub mod provider;
pub mod raw_event;
pub mod scan;
pub mod select;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use exchange::{ExchangeConfig, ExchangeProvider};
pub use google::{GoogleConfig, GoogleProvider};
pub use normalize::{DayBounds, normalize_event};
pub use provider::{BoxFuture, CalendarProvider, CalendarRef, CalendarScope, ProviderKind};
pub use raw_event::{RawEvent, RawEventTime};
pub use scan::{ScanOptions, scan};
pub use select::{filter_by_prefix, select_calendars};
