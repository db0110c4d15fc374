//! Command line interface for the site backend. Supports initializing the
//! data directories, refreshing the events snapshot from the configured
//! upstream sources, and serving the HTTP endpoints the site calls.

mod api;
mod classify;
mod config;
mod event;
mod feed;
mod ingest;
mod server;
mod storage;
mod submit;
mod when;

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use config::Settings;

/// Command line interface entry point.
#[derive(Parser)]
#[command(
    name = "quedada",
    author,
    version,
    about = "File-backed community events and submissions backend"
)]
struct Cli {
    /// Path to the `.env` configuration file.
    #[arg(long, default_value = ".env")]
    env: String,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Write a default `.env` if absent and create the data directories.
    Init,
    /// Refresh the events snapshot from the configured upstream sources.
    Fetch,
    /// Serve the HTTP endpoints used by the site.
    Serve,
}

/// Execute the selected CLI subcommand.
async fn run(cli: Cli) -> anyhow::Result<()> {
    ensure_env_file(&cli.env)?;
    let cfg = Settings::from_env(&cli.env)?;
    match cli.command {
        Commands::Init => init_dirs(&cfg)?,
        Commands::Fetch => ingest::run(&cfg).await?,
        Commands::Serve => {
            init_dirs(&cfg)?;
            let addr: SocketAddr = cfg.bind_http.parse()?;
            println!("[serve] listening on http://{addr}");
            server::serve_http(addr, cfg, std::future::pending()).await?;
        }
    }
    Ok(())
}

/// Create the parent directory of every configured store file.
fn init_dirs(cfg: &Settings) -> anyhow::Result<()> {
    for file in [&cfg.events_file, &cfg.proposals_file, &cfg.messages_file] {
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Create a default `.env` file if one is not already present at `path`.
fn ensure_env_file(path: &str) -> anyhow::Result<()> {
    let env_path = Path::new(path);
    if env_path.exists() {
        return Ok(());
    }
    if let Some(parent) = env_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let base_dir = match env_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let mut content = String::new();
    content.push_str("MEETUP_GROUP=python_zgz\n");
    content.push_str("MEETUP_TOKEN=\n");
    content.push_str("API_BASE=\n");
    content.push_str("FEED_URL=\n");
    content.push_str(&format!(
        "EVENTS_FILE={}\n",
        display_path(&base_dir.join("assets/events.json"))
    ));
    content.push_str(&format!(
        "PROPOSALS_FILE={}\n",
        display_path(&base_dir.join("data/proposals.json"))
    ));
    content.push_str(&format!(
        "MESSAGES_FILE={}\n",
        display_path(&base_dir.join("data/messages.json"))
    ));
    content.push_str("BIND_HTTP=127.0.0.1:7700\n");
    content.push_str("HTTP_TIMEOUT_SECS=20\n");
    content.push_str("FEED_TZ=Europe/Madrid\n");
    fs::write(env_path, content)?;
    Ok(())
}

fn display_path(path: &PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;
    use tempfile::TempDir;

    fn clear_vars() {
        for v in [
            "MEETUP_GROUP",
            "MEETUP_TOKEN",
            "API_BASE",
            "FEED_URL",
            "EVENTS_FILE",
            "PROPOSALS_FILE",
            "MESSAGES_FILE",
            "BIND_HTTP",
            "HTTP_TIMEOUT_SECS",
            "FEED_TZ",
        ] {
            std::env::remove_var(v);
        }
    }

    #[tokio::test]
    async fn init_creates_default_env_and_dirs() {
        let _g = ENV_MUTEX.lock().unwrap();
        clear_vars();
        let dir = TempDir::new().unwrap();
        let env_path = dir.path().join(".env");

        run(Cli {
            env: env_path.to_string_lossy().into_owned(),
            command: Commands::Init,
        })
        .await
        .unwrap();

        let data = fs::read_to_string(&env_path).unwrap();
        assert!(data.contains("MEETUP_GROUP=python_zgz"));
        assert!(data.contains("BIND_HTTP=127.0.0.1:7700"));
        assert!(dir.path().join("assets").exists());
        assert!(dir.path().join("data").exists());
    }

    #[tokio::test]
    async fn fetch_writes_snapshot_from_feed() {
        let _g = ENV_MUTEX.lock().unwrap();
        clear_vars();
        let dir = TempDir::new().unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/feed.ics",
            axum::routing::get(|| async {
                concat!(
                    "BEGIN:VEVENT\n",
                    "SUMMARY:Prueba\n",
                    "DTSTART:20300601T180000Z\n",
                    "END:VEVENT\n",
                )
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });

        let env_path = dir.path().join(".env");
        let events_file = dir.path().join("events.json");
        fs::write(
            &env_path,
            format!(
                "MEETUP_GROUP=python_zgz\nFEED_URL=http://{addr}/feed.ics\nEVENTS_FILE={}\n",
                events_file.display()
            ),
        )
        .unwrap();

        run(Cli {
            env: env_path.to_string_lossy().into_owned(),
            command: Commands::Fetch,
        })
        .await
        .unwrap();

        let written = storage::read_list(&events_file);
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["name"], "Prueba");
    }

    #[tokio::test]
    async fn existing_env_file_is_left_alone() {
        let _g = ENV_MUTEX.lock().unwrap();
        clear_vars();
        let dir = TempDir::new().unwrap();
        let env_path = dir.path().join(".env");
        fs::write(
            &env_path,
            format!(
                "MEETUP_GROUP=otro_grupo\nEVENTS_FILE={0}/events.json\nPROPOSALS_FILE={0}/proposals.json\nMESSAGES_FILE={0}/messages.json\n",
                dir.path().display()
            ),
        )
        .unwrap();

        run(Cli {
            env: env_path.to_string_lossy().into_owned(),
            command: Commands::Init,
        })
        .await
        .unwrap();

        let data = fs::read_to_string(&env_path).unwrap();
        assert!(data.contains("otro_grupo"));
        assert!(!data.contains("python_zgz"));
    }
}
