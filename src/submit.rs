//! Validation and normalization of user-submitted forms.
//!
//! Pure functions: no I/O, no retained state. A malformed-but-parseable
//! field (say, a non-numeric duration) is a validation message for the
//! visitor, never a failure. Accepted submissions are immutable once
//! persisted; the stores they land in are append-only.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// A talk proposal accepted into the proposals store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub title: String,
    pub speaker: String,
    pub email: String,
    pub level: Option<String>,
    /// Requested slot length in minutes.
    pub duration: Option<u32>,
    pub summary: String,
    /// ISO-8601 UTC timestamp with trailing `Z`.
    pub created_at: String,
}

/// A contact-form message accepted into the messages store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    /// ISO-8601 UTC timestamp with trailing `Z`.
    pub created_at: String,
}

impl Proposal {
    /// Validate a submitted form and build the normalized record.
    ///
    /// Errors come back in the form's field order, one message per violated
    /// rule; callers join them into a single display string. Title, speaker,
    /// email, level and summary are required; duration is optional but must
    /// be a positive whole number of minutes when given.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Proposal, Vec<String>> {
        let title = field(form, "title");
        let speaker = field(form, "speaker");
        let email = field(form, "email");
        let level = field(form, "level");
        let duration_raw = field(form, "duration");
        let summary = field(form, "summary");

        let mut errors = Vec::new();
        if title.is_empty() {
            errors.push("Title is required.".to_string());
        }
        if speaker.is_empty() {
            errors.push("Speaker name is required.".to_string());
        }
        if email.is_empty() {
            errors.push("Email is required.".to_string());
        } else if !EMAIL_RE.is_match(email) {
            errors.push("Email address is not valid.".to_string());
        }
        if level.is_empty() {
            errors.push("Level is required.".to_string());
        }
        let duration = match duration_raw {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(minutes) if minutes > 0 => Some(minutes),
                _ => {
                    errors.push(
                        "Duration must be a positive whole number of minutes.".to_string(),
                    );
                    None
                }
            },
        };
        if summary.is_empty() {
            errors.push("Summary is required.".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Proposal {
            title: title.to_string(),
            speaker: speaker.to_string(),
            email: email.to_string(),
            level: Some(level.to_string()),
            duration,
            summary: summary.to_string(),
            created_at: stamp_now(),
        })
    }
}

impl ContactMessage {
    /// Validate a contact form: name, email and message are all required.
    pub fn from_form(form: &HashMap<String, String>) -> Result<ContactMessage, Vec<String>> {
        let name = field(form, "name");
        let email = field(form, "email");
        let message = field(form, "message");

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("Name is required.".to_string());
        }
        if email.is_empty() {
            errors.push("Email is required.".to_string());
        } else if !EMAIL_RE.is_match(email) {
            errors.push("Email address is not valid.".to_string());
        }
        if message.is_empty() {
            errors.push("Message is required.".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at: stamp_now(),
        })
    }
}

fn field<'a>(form: &'a HashMap<String, String>, key: &str) -> &'a str {
    form.get(key).map(String::as_str).unwrap_or("").trim()
}

fn stamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
