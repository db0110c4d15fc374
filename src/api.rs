//! Client for the meetup provider's JSON events API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::event::{Event, Venue};

/// Fetch every event for `group`, both upcoming and past, newest first.
///
/// One page of 200 covers years of activity for a community group, so
/// pagination never goes past the first page. A non-2xx response is an
/// error; a body that is not a JSON array yields an empty list rather
/// than a guess at its shape.
pub async fn fetch(
    base: &str,
    group: &str,
    token: &str,
    timeout: Duration,
) -> Result<Vec<Event>> {
    let url = format!("{}/{}/events", base.trim_end_matches('/'), group);
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let body: Value = client
        .get(&url)
        .query(&[("status", "upcoming,past"), ("desc", "true"), ("page", "200")])
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("decoding events response")?;
    let Some(items) = body.as_array() else {
        return Ok(Vec::new());
    };
    Ok(items.iter().map(normalize).collect())
}

/// Normalize one raw API record into the canonical schema.
///
/// The provider has used both `link` and `event_url` for the event page,
/// and `venue` may be missing, null, or present with an empty name. The
/// event name doubles as the description, which is all the site renders.
pub fn normalize(raw: &Value) -> Event {
    let name = string_field(raw, "name");
    let link = string_field(raw, "link").or_else(|| string_field(raw, "event_url"));
    let time = raw
        .get("time")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));
    let venue = raw
        .get("venue")
        .and_then(Value::as_object)
        .and_then(|venue| venue.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(|name| Venue {
            name: name.to_string(),
        });
    Event {
        description: name.clone(),
        name,
        link,
        time,
        venue,
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
