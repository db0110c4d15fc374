//! Batch refresh of the local events snapshot.

use anyhow::Result;

use crate::{api, config::Settings, event::Event, feed, storage};

/// Run one ingestion pass and atomically replace the events file.
///
/// The API is only worth trying with a token configured; a failing source
/// is logged and swallowed. The feed is consulted once whenever the API
/// produced nothing, and an empty snapshot is still a valid refresh. Only
/// the final write can come back as an error, in which case the previous
/// snapshot is left in place.
pub async fn run(cfg: &Settings) -> Result<()> {
    let mut events: Vec<Event> = Vec::new();
    if let Some(token) = &cfg.api_token {
        match api::fetch(&cfg.api_base, &cfg.group, token, cfg.http_timeout).await {
            Ok(found) => events = found,
            Err(err) => eprintln!("[ingest] api fetch failed: {err}"),
        }
    }
    if events.is_empty() {
        match feed::fetch(&cfg.feed_url(), cfg.http_timeout, cfg.feed_tz).await {
            Ok(found) => events = found,
            Err(err) => eprintln!("[ingest] feed fetch failed: {err}"),
        }
    }
    storage::replace_atomic(&cfg.events_file, &events)?;
    println!(
        "[ingest] wrote {} events to {}",
        events.len(),
        cfg.events_file.display()
    );
    Ok(())
}
