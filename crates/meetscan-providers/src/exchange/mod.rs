//! Microsoft Exchange (EWS) backend.
//!
//! Talks SOAP to an EWS endpoint: FindFolder for the default calendar's
//! sub-calendars, FindItem with a CalendarView for occurrences inside the
//! window, GetItem for the fields the scan needs (including the HTML body,
//! which the link matcher falls back to).

mod client;
mod config;
mod provider;
mod soap;

pub use config::ExchangeConfig;
pub use provider::ExchangeProvider;
pub use soap::DEFAULT_CALENDAR_ID;
