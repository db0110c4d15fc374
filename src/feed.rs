//! Decoder for the group's public iCalendar feed.
//!
//! The feed is the fallback event source: RFC-5545-style text, folded
//! lines and all. Decoding is deliberately lenient; a block the decoder
//! cannot make sense of yields an event with fewer fields, not an error.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::event::{Event, Venue};

/// `DTSTART` literal layouts, tried in order.
const DTSTART_FORMATS: [&str; 3] = ["%Y%m%dT%H%M%SZ", "%Y%m%dT%H%M%S", "%Y%m%dT%H%M"];

/// One `BEGIN:VEVENT`..`END:VEVENT` block while it is being collected:
/// uppercase property name to value, plus the timezone id attached to the
/// start time, when the feed gave one.
#[derive(Default)]
struct Block {
    properties: HashMap<String, String>,
    start_tzid: Option<String>,
}

/// Fetch and decode the feed at `url`.
///
/// A non-2xx status is an error; the orchestrator treats any failure here
/// as "this source produced nothing".
pub async fn fetch(url: &str, timeout: Duration, home_tz: Tz) -> Result<Vec<Event>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .context("reading feed body")?;
    Ok(decode(&body, home_tz))
}

/// Decode feed text into canonical events, one per `VEVENT` block.
///
/// Unfolding happens before any property parsing. Lines outside a block,
/// lines with no `:`, and a dangling block cut off before its `END:VEVENT`
/// are all skipped.
pub fn decode(text: &str, home_tz: Tz) -> Vec<Event> {
    let mut events = Vec::new();
    let mut block: Option<Block> = None;

    for logical in unfold(text) {
        let line = logical.trim();
        if line == "BEGIN:VEVENT" {
            block = Some(Block::default());
            continue;
        }
        if line == "END:VEVENT" {
            if let Some(done) = block.take() {
                if !done.properties.is_empty() {
                    events.push(done.into_event(home_tz));
                }
            }
            continue;
        }
        let Some(current) = block.as_mut() else {
            continue;
        };
        let Some((key_part, value)) = line.split_once(':') else {
            continue;
        };
        let (name, params) = match key_part.split_once(';') {
            Some((name, params)) => (name, Some(params)),
            None => (key_part, None),
        };
        let name = name.trim().to_uppercase();
        if name == "DTSTART" {
            if let Some(tzid) = params.and_then(tzid_param) {
                current.start_tzid = Some(tzid);
            }
        }
        current.properties.insert(name, value.trim().to_string());
    }

    events
}

/// Undo RFC 5545 line folding: a physical line starting with a space
/// continues the previous logical line, minus that space.
fn unfold(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for physical in raw.lines() {
        if let Some(rest) = physical.strip_prefix(' ') {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(physical.to_string());
    }
    lines
}

/// Pull `TZID=...` out of a `;`-delimited parameter list.
fn tzid_param(params: &str) -> Option<String> {
    params.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("TZID")
            .then(|| value.trim().to_string())
    })
}

impl Block {
    fn into_event(self, home_tz: Tz) -> Event {
        let time = self
            .properties
            .get("DTSTART")
            .and_then(|raw| resolve_dtstart(raw, self.start_tzid.as_deref(), home_tz))
            .map(|at| at.timestamp_millis());
        let venue = self
            .properties
            .get("LOCATION")
            .filter(|name| !name.is_empty())
            .map(|name| Venue { name: name.clone() });
        Event {
            name: self.properties.get("SUMMARY").cloned(),
            link: self.properties.get("URL").cloned(),
            time,
            venue,
            description: None,
        }
    }
}

/// Resolve a `DTSTART` literal to UTC.
///
/// A trailing `Z` always means UTC, even when a `TZID` parameter is also
/// present. Otherwise the captured zone applies, with the group's home
/// zone standing in both for unknown zone ids and for feeds that state no
/// zone at all.
fn resolve_dtstart(raw: &str, tzid: Option<&str>, home_tz: Tz) -> Option<DateTime<Utc>> {
    for format in DTSTART_FORMATS {
        let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) else {
            continue;
        };
        if raw.ends_with('Z') {
            return Some(naive.and_utc());
        }
        let tz = tzid
            .and_then(|id| id.parse::<Tz>().ok())
            .unwrap_or(home_tz);
        return Some(tz.from_local_datetime(&naive).earliest()?.with_timezone(&Utc));
    }
    None
}
