//! fenster-demo — a headless sample application on top of fenster-bridge.
//!
//! Recreates the classic poll-driven UI setup without a real toolkit: a
//! scripted UI surface fires simulated user inputs, a counter task ticks
//! in the background, and deferred jobs drain one per poll iteration.
//!
//! # Usage
//!
//! ```bash
//! fenster-demo
//!
//! # Faster polling, custom input script
//! RUST_LOG=debug fenster-demo --poll-interval-ms 20 \
//!     --script "10:status,20:job,25:job,80:quit"
//! ```

mod tasks;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use fenster_bridge::{Bridge, BridgeConfig};
use tracing::info;

use crate::tasks::CounterTask;
use crate::ui::{HeadlessUi, ScriptEvent};

/// Headless demo app for the fenster event-loop bridge.
#[derive(Parser, Debug)]
#[command(name = "fenster-demo", version, about)]
struct Cli {
    /// Poll interval override in milliseconds.
    #[arg(long, env = "FENSTER_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Optional TOML config file.
    #[arg(long, env = "FENSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated user input: comma-separated "refresh:action" pairs.
    /// Known actions: status, job, quit.
    #[arg(long, default_value = "10:status,20:job,25:job,80:quit")]
    script: String,

    /// Safety stop after this many seconds if the script never quits.
    #[arg(long, env = "FENSTER_MAX_RUN_SECS", default_value_t = 30)]
    max_run_secs: u64,
}

fn parse_script(raw: &str) -> anyhow::Result<Vec<ScriptEvent>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (at, action) = entry
                .split_once(':')
                .with_context(|| format!("script entry '{entry}' is not 'refresh:action'"))?;
            Ok(ScriptEvent {
                at_refresh: at
                    .parse()
                    .with_context(|| format!("bad refresh number in '{entry}'"))?,
                action: action.to_string(),
            })
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }

    let script = parse_script(&cli.script)?;
    let ui = HeadlessUi::new(script);
    let controls = ui.controls();

    let mut bridge = Bridge::new(ui, config);
    bridge.register_task(Box::new(CounterTask::new(Duration::from_secs(1))));
    let handle = bridge.handle();

    controls.bind_callback("status", || info!(now = %Utc::now(), "status requested"));
    controls.bind_deferred("job", handle.clone(), || async {
        info!("deferred job started");
        tokio::time::sleep(Duration::from_secs(1)).await;
        info!("deferred job finished");
        Ok(())
    });
    let quit = handle.clone();
    controls.bind_callback("quit", move || quit.request_stop());

    let watchdog = handle.clone();
    let max_run = Duration::from_secs(cli.max_run_secs);
    tokio::spawn(async move {
        tokio::time::sleep(max_run).await;
        if watchdog.is_running() {
            info!("maximum run time reached, stopping");
            watchdog.request_stop();
        }
    });

    bridge.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_default_script() {
        let script = parse_script("10:status,20:job,25:job,80:quit").unwrap();
        assert_eq!(script.len(), 4);
        assert_eq!(script[0].at_refresh, 10);
        assert_eq!(script[0].action, "status");
        assert_eq!(script[3].action, "quit");
    }

    #[test]
    fn tolerates_whitespace_and_trailing_commas() {
        let script = parse_script(" 5:status , 9:quit ,").unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[1].at_refresh, 9);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse_script("nope").is_err());
        assert!(parse_script("x:quit").is_err());
    }
}
