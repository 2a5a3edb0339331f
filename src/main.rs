mod auth;
mod credentials;
mod db;
mod error;
mod ipc;
mod seed;
mod settings;
mod storage;
mod users;

use anyhow::Context;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries nothing but IPC responses.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
}

fn main() -> anyhow::Result<()> {
    let config_file = settings::config_file();
    let settings =
        settings::load(config_file.as_deref()).context("failed to load configuration")?;
    init_tracing(&settings.log.filter)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edusmartd starting");
    if let Some(path) = &config_file {
        tracing::debug!(path = %path.display(), "loaded configuration file");
    }

    let startup_workspace = settings.workspace.path.clone();
    let mut state = ipc::AppState::new(settings);
    if let Some(path) = startup_workspace {
        // A bad configured path should not keep the host from selecting another.
        if let Err(e) = state.open_workspace(path) {
            tracing::error!(error = %format!("{e:#}"), "configured workspace failed to open");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed; exiting");
    Ok(())
}
