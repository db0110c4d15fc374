use assert_cmd::prelude::*;
use std::{fs, process::Command};
use tempfile::TempDir;

fn write_env(dir: &TempDir, extra: &str) -> String {
    let env_path = dir.path().join("env");
    let content = format!(
        "MEETUP_GROUP=python_zgz\nEVENTS_FILE={0}/assets/events.json\nPROPOSALS_FILE={0}/data/proposals.json\nMESSAGES_FILE={0}/data/messages.json\nBIND_HTTP=127.0.0.1:0\n{extra}",
        dir.path().display()
    );
    fs::write(&env_path, content).unwrap();
    env_path.to_str().unwrap().to_string()
}

#[test]
fn init_cli_bootstraps_env_and_dirs() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join("env");

    Command::cargo_bin("quedada")
        .unwrap()
        .args(["--env", env_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    let data = fs::read_to_string(&env_path).unwrap();
    assert!(data.contains("MEETUP_GROUP=python_zgz"));
    assert!(data.contains("FEED_TZ=Europe/Madrid"));
    assert!(dir.path().join("assets").exists());
    assert!(dir.path().join("data").exists());
}

#[test]
fn init_cli_respects_existing_env() {
    let dir = TempDir::new().unwrap();
    let env_path = write_env(&dir, "");

    Command::cargo_bin("quedada")
        .unwrap()
        .args(["--env", &env_path, "init"])
        .assert()
        .success();

    let data = fs::read_to_string(&env_path).unwrap();
    assert!(!data.contains("MEETUP_TOKEN"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetch_cli_writes_snapshot_from_feed() {
    let dir = TempDir::new().unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().route(
        "/feed.ics",
        axum::routing::get(|| async {
            concat!(
                "BEGIN:VCALENDAR\n",
                "BEGIN:VEVENT\n",
                "SUMMARY:Charla de\n",
                " primavera\n",
                "DTSTART;TZID=Europe/Madrid:20300601T180000\n",
                "LOCATION:La Terminal\n",
                "END:VEVENT\n",
                "END:VCALENDAR\n",
            )
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    let env_path = write_env(&dir, &format!("FEED_URL=http://{addr}/feed.ics\n"));

    Command::cargo_bin("quedada")
        .unwrap()
        .args(["--env", &env_path, "fetch"])
        .assert()
        .success();

    let raw = fs::read_to_string(dir.path().join("assets/events.json")).unwrap();
    let events: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "Charla deprimavera");
    assert_eq!(events[0]["venue"]["name"], "La Terminal");
    // 18:00 Madrid summer time is 16:00 UTC.
    assert_eq!(events[0]["time"], 1_906_560_000_000_i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetch_cli_writes_empty_snapshot_when_sources_fail() {
    let dir = TempDir::new().unwrap();
    let env_path = write_env(
        &dir,
        "FEED_URL=http://127.0.0.1:1/feed.ics\nHTTP_TIMEOUT_SECS=1\n",
    );

    Command::cargo_bin("quedada")
        .unwrap()
        .args(["--env", &env_path, "fetch"])
        .assert()
        .success();

    let raw = fs::read_to_string(dir.path().join("assets/events.json")).unwrap();
    assert_eq!(raw.trim(), "[]");
}
