//! Core types: time windows, link matching, meeting records

pub mod links;
pub mod meeting;
pub mod time;
pub mod tracing;

pub use links::{BodyFallback, ConferencingLink, LinkKind, LinkMatcher, LinkSource, match_body};
pub use meeting::{NO_TITLE, NormalizedMeeting};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
