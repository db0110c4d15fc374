//! HTTP endpoints backing the community site's dynamic pieces.
//!
//! The presentation layer is a separate static site; it reads the event
//! buckets from here and posts form submissions back. Everything else
//! about the site (pages, styling, navigation) lives outside this crate.

use std::{collections::HashMap, future::Future, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    classify,
    config::Settings,
    storage,
    submit::{ContactMessage, Proposal},
};

#[derive(Clone)]
struct HttpState {
    cfg: Settings,
}

/// Response body for the `/healthz` endpoint.
#[derive(Serialize, Deserialize)]
struct Health {
    /// Always "ok" when the server is running.
    status: String,
}

/// Info document served at `/`.
#[derive(Serialize, Deserialize)]
struct SiteInfo {
    /// Group urlname this instance serves.
    group: String,
    /// Software identifier (here it is always "quedada").
    software: String,
    /// Semantic version string such as "0.1.0".
    version: String,
}

/// Events split for the presentation layer.
#[derive(Serialize, Deserialize)]
struct EventBuckets {
    upcoming: Vec<Value>,
    past: Vec<Value>,
}

/// Acknowledgement for an accepted submission.
#[derive(Serialize, Deserialize)]
struct Submitted {
    status: String,
}

/// User-facing failure, either validation or persistence.
#[derive(Serialize, Deserialize)]
struct Failure {
    error: String,
}

/// Start the HTTP server for the presentation layer.
pub async fn serve_http(
    addr: SocketAddr,
    cfg: Settings,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let state = Arc::new(HttpState { cfg });
    let app = Router::new()
        .route("/", get(site_info))
        .route("/healthz", get(healthz))
        .route("/events", get(events))
        .route("/proposals", post(submit_proposal))
        .route("/contact", post(submit_contact))
        .with_state(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Health check endpoint.
async fn healthz() -> Json<Health> {
    println!("[http] GET /healthz");
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn site_info(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    println!("[http] GET /");
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(SiteInfo {
            group: state.cfg.group.clone(),
            software: "quedada".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }),
    )
}

/// Events from the snapshot file, classified around the current time.
async fn events(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let records = storage::read_list(&state.cfg.events_file);
    let buckets = classify::split(&records, Utc::now());
    println!(
        "[http] GET /events -> {} upcoming, {} past",
        buckets.upcoming.len(),
        buckets.past.len()
    );
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(EventBuckets {
            upcoming: buckets.upcoming,
            past: buckets.past,
        }),
    )
}

/// Validate and persist a talk proposal.
async fn submit_proposal(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<HashMap<String, String>>,
) -> axum::response::Response {
    match Proposal::from_form(&form) {
        Ok(proposal) => persist(&state.cfg.proposals_file, &proposal, "proposals"),
        Err(errors) => rejected("proposals", errors),
    }
}

/// Validate and persist a contact message.
async fn submit_contact(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<HashMap<String, String>>,
) -> axum::response::Response {
    match ContactMessage::from_form(&form) {
        Ok(message) => persist(&state.cfg.messages_file, &message, "contact"),
        Err(errors) => rejected("contact", errors),
    }
}

/// Append an accepted submission, keeping storage internals out of the
/// response.
fn persist<T: Serialize>(path: &Path, record: &T, route: &str) -> axum::response::Response {
    match storage::append(path, record) {
        Ok(()) => {
            println!("[http] POST /{route} accepted");
            Json(Submitted {
                status: "ok".into(),
            })
            .into_response()
        }
        Err(err) => {
            eprintln!("[http] POST /{route} store failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Failure {
                    error: "Could not save your submission. Please try again later.".into(),
                }),
            )
                .into_response()
        }
    }
}

fn rejected(route: &str, errors: Vec<String>) -> axum::response::Response {
    println!("[http] POST /{route} rejected: {} errors", errors.len());
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(Failure {
            error: errors.join(" "),
        }),
    )
        .into_response()
}
