//! Smartmarks RPC Server: JSON-RPC over stdin/stdout for a UI front end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Push:     {"event":"bookmarks.changed"} whenever the mirror was refetched
//!           because of an auth event or a remote change.

use std::time::Instant;

use env_logger::Env;
use log::{info, warn};
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use smartmarks::app::App;
use smartmarks::rpc_handler::{handle_method, session_json};
use smartmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

async fn emit(stdout: &mut io::Stdout, value: &Value) -> io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = SettingsEngine::new(None);
    if let Err(e) = settings.load() {
        eprintln!("settings unavailable, using defaults: {}", e);
    }
    let level = settings.get_settings().log_level.clone();
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
    info!("settings from {}", settings.get_config_path());

    let mut app = App::from_settings(settings)?;
    let state = app.start().await;

    let mut stdout = io::stdout();
    emit(
        &mut stdout,
        &json!({"event":"ready","version":env!("CARGO_PKG_VERSION"),"session":session_json(&state)}),
    )
    .await?;

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let req: Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        emit(&mut stdout, &json!({"id":null,"error":format!("parse error: {}", e)})).await?;
                        continue;
                    }
                };
                let id = req.get("id").cloned().unwrap_or(Value::Null);

                if !rate_limiter.check() {
                    emit(&mut stdout, &json!({"id": id, "error": "rate limit exceeded"})).await?;
                    continue;
                }

                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                let response = match handle_method(&mut app, method, &params).await {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => json!({"id": id, "error": err}),
                };
                emit(&mut stdout, &response).await?;
            }
            event = app.next_event() => {
                let Some(event) = event else { continue };
                if app.handle_event(event).await {
                    emit(&mut stdout, &json!({"event":"bookmarks.changed"})).await?;
                }
            }
        }
    }

    info!("stdin closed, shutting down");
    app.shutdown().await;
    Ok(())
}
