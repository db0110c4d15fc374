//! Bucketing of snapshot events for display.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::when;

/// Events split for rendering: soonest upcoming first, most recent past
/// first.
#[derive(Debug, Default, PartialEq)]
pub struct Buckets {
    pub upcoming: Vec<Value>,
    pub past: Vec<Value>,
}

/// Split `records` around `now`.
///
/// A record resolving to `now` or later is upcoming, strictly earlier is
/// past, and a record with no resolvable time lands in neither bucket.
/// Records are loose JSON values rather than the canonical struct so that
/// hand-edited snapshot entries with string dates still classify.
pub fn split(records: &[Value], now: DateTime<Utc>) -> Buckets {
    let mut upcoming = Vec::new();
    let mut past = Vec::new();
    for record in records {
        match when::resolve(record) {
            Some(at) if at >= now => upcoming.push((at, record.clone())),
            Some(at) => past.push((at, record.clone())),
            None => {}
        }
    }
    upcoming.sort_by_key(|(at, _)| *at);
    past.sort_by_key(|(at, _)| Reverse(*at));
    Buckets {
        upcoming: upcoming.into_iter().map(|(_, record)| record).collect(),
        past: past.into_iter().map(|(_, record)| record).collect(),
    }
}
