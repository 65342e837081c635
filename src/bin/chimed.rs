//! Alarm daemon for chime.

use anyhow::Context;
use chime::clock::{Clock, ClockWatcher, LiveClock};
use chime::planner::{StoreWatcher, UpcomingPlanner};
use chime::timer::LiveWakeupTimer;
use chime::{AlarmQueue, ChimeConfig, SimpleAlarmQueue};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Chime: fires calendar alarms when they are due.
#[derive(Parser)]
#[command(name = "chimed", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Appointment store to watch (overrides the configured path).
    #[arg(short, long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chimed=info,chime=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ChimeConfig::default_config_path);
    let config = if config_path.exists() {
        ChimeConfig::from_file(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        ChimeConfig::default()
    };
    let store_path = cli.store.unwrap_or_else(|| config.planner.store_path());

    let cancel = CancellationToken::new();

    let clock = Arc::new(LiveClock::new());
    let clock_watcher = ClockWatcher::new(Arc::clone(&clock), &config.clock, cancel.child_token());
    let clock_task = tokio::spawn(clock_watcher.run());

    let planner = Arc::new(UpcomingPlanner::new(clock.clone(), config.planner.lookback()));
    let mut store_watcher = StoreWatcher::new(
        store_path.clone(),
        Arc::clone(&planner),
        config.planner.reload_interval(),
        cancel.child_token(),
    );
    // Load before the queue exists so alarms are evaluated against the store.
    if let Err(e) = store_watcher.reload() {
        warn!("starting with an empty planner: {e}");
    }
    let store_task = tokio::spawn(store_watcher.run());

    let timer = Arc::new(LiveWakeupTimer::new(
        clock.clone(),
        &config.timer,
        tokio::runtime::Handle::current(),
    ));

    let display_clock = Arc::clone(&clock);
    let mut queue = SimpleAlarmQueue::new(clock, planner, timer);
    let mut events = queue.subscribe();
    let queue_task = queue.run(cancel.child_token());

    info!(store = %store_path.display(), "chimed running");

    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_on_signal.cancel();
        }
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                let local = event.alarm.time.with_timezone(&display_clock.utc_offset());
                info!(
                    uid = %event.appointment.uid,
                    summary = %event.appointment.summary,
                    at = %local.format("%Y-%m-%d %H:%M"),
                    text = %event.alarm.text,
                    "alarm"
                );
                println!(
                    "[{}] {}: {}",
                    local.format("%H:%M"),
                    event.appointment.summary,
                    event.alarm.text
                );
            }
        }
    }

    cancel.cancel();
    for task in [queue_task, clock_task, store_task] {
        if let Err(e) = task.await {
            warn!("task ended abnormally: {e}");
        }
    }
    Ok(())
}
