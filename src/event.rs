//! Canonical event model shared by every ingestion source.

use serde::{Deserialize, Serialize};

/// Venue attached to an event when the source announces one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    /// Human-readable venue name, e.g. a bar or a coworking space.
    pub name: String,
}

/// Community event persisted to the events snapshot and served to the
/// presentation layer.
///
/// Every field is optional because upstream records are messy. `time` is
/// epoch milliseconds and always UTC, whatever zone the source spoke; an
/// event whose time could not be resolved stays in the snapshot but is
/// shown in neither the upcoming nor the past bucket.
///
/// ```json
/// {
///   "name": "Meetup mensual",
///   "link": "https://www.meetup.com/python_zgz/events/123456/",
///   "time": 1717257600000,
///   "venue": { "name": "La Terminal" },
///   "description": "Meetup mensual"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event title.
    pub name: Option<String>,
    /// URL of the event page.
    pub link: Option<String>,
    /// Start time as epoch milliseconds, UTC.
    pub time: Option<i64>,
    /// Where the event happens, if announced.
    pub venue: Option<Venue>,
    /// Short description; the API source mirrors the name here.
    pub description: Option<String>,
}
