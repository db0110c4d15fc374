//! Configuration loading from `.env` files.

use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use url::Url;

/// Zone assumed for feed times when none is given or the id is unknown.
pub const HOME_TZ: Tz = chrono_tz::Europe::Madrid;

/// Runtime settings derived from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Meetup group urlname, e.g. `python_zgz`.
    pub group: String,
    /// OAuth bearer token for the events API; `None` skips the API source.
    pub api_token: Option<String>,
    /// Events API base URL.
    pub api_base: String,
    /// Full feed URL override; `None` derives the group's public feed.
    pub feed_override: Option<String>,
    /// Snapshot file the presentation layer reads events from.
    pub events_file: PathBuf,
    /// Append-only store for talk proposals.
    pub proposals_file: PathBuf,
    /// Append-only store for contact messages.
    pub messages_file: PathBuf,
    /// HTTP bind address, e.g. `127.0.0.1:7700`.
    pub bind_http: String,
    /// Ceiling for upstream HTTP calls.
    pub http_timeout: Duration,
    /// Home zone for feed times without a usable `TZID`.
    pub feed_tz: Tz,
}

impl Settings {
    /// Load settings from the specified `.env` file.
    pub fn from_env(path: &str) -> Result<Self> {
        dotenvy::from_filename(path).context("reading env file")?;
        let group = env::var("MEETUP_GROUP")
            .ok()
            .filter(|s| !s.is_empty())
            .context("MEETUP_GROUP is required")?;
        let api_token = env::var("MEETUP_TOKEN").ok().filter(|s| !s.is_empty());
        let api_base = match env::var("API_BASE").ok().filter(|s| !s.is_empty()) {
            Some(base) => {
                Url::parse(&base).context("API_BASE is not a valid URL")?;
                base
            }
            None => "https://api.meetup.com".to_string(),
        };
        let feed_override = match env::var("FEED_URL").ok().filter(|s| !s.is_empty()) {
            Some(feed) => {
                Url::parse(&feed).context("FEED_URL is not a valid URL")?;
                Some(feed)
            }
            None => None,
        };
        let events_file = path_var("EVENTS_FILE", "assets/events.json");
        let proposals_file = path_var("PROPOSALS_FILE", "data/proposals.json");
        let messages_file = path_var("MESSAGES_FILE", "data/messages.json");
        let bind_http = env::var("BIND_HTTP").unwrap_or_else(|_| "127.0.0.1:7700".into());
        let http_timeout = Duration::from_secs(
            env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
        );
        // An unrecognized zone id falls back to the home zone rather than
        // refusing to start.
        let feed_tz = env::var("FEED_TZ")
            .ok()
            .and_then(|id| id.parse::<Tz>().ok())
            .unwrap_or(HOME_TZ);
        Ok(Self {
            group,
            api_token,
            api_base,
            feed_override,
            events_file,
            proposals_file,
            messages_file,
            bind_http,
            http_timeout,
            feed_tz,
        })
    }

    /// The feed URL to fetch: the override, or the group's public feed.
    pub fn feed_url(&self) -> String {
        self.feed_override
            .clone()
            .unwrap_or_else(|| format!("https://www.meetup.com/{}/events/ical/", self.group))
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()))
}

/// Serializes every test that reads or writes process environment
/// variables; `dotenvy` loads into the process-wide environment.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
