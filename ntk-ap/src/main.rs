//! Advice Player (ntk-ap) - Main entry point
//!
//! Plays one voice advice assembled from sound clips on the default (or
//! named) output device and exits when it has finished.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ntk_ap::audio::CpalBackend;
use ntk_ap::backend::backend_channel;
use ntk_ap::clips::SoundFileStore;
use ntk_ap::config::TomlConfig;
use ntk_ap::{AdvicePlayer, AdvicePriority, AdviceSequencer};
use ntk_common::config::{resolve_resource_path, RESOURCE_PATH_ENV};
use ntk_common::events::{EventBus, NtkEvent};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Command-line arguments for ntk-ap
#[derive(Parser, Debug)]
#[command(name = "ntk-ap")]
#[command(about = "Voice advice player for NTK navigation")]
#[command(version)]
struct Args {
    /// Clip names, played in order (e.g. "turn_left" "in" "200" "meters")
    #[arg(required = true)]
    clips: Vec<String>,

    /// Advice priority (0 = user, 1 = navigation, 2 = speed warning)
    #[arg(short, long, default_value = "1")]
    priority: u8,

    /// Folder holding one sub-folder per voice language
    #[arg(short, long, env = RESOURCE_PATH_ENV)]
    resource_path: Option<PathBuf>,

    /// Voice language (overrides the config file)
    #[arg(short, long)]
    language: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output device name (default device if omitted or not found)
    #[arg(short, long)]
    device: Option<String>,

    /// Give up waiting for the advice after this many seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ntk_ap={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting NTK Advice Player (build {} {}, {})",
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );

    let resource_path = resolve_resource_path(
        args.resource_path.as_deref(),
        RESOURCE_PATH_ENV,
        config.resource_path.as_deref(),
    );
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| config.voice_language.clone());
    info!(
        "Resource path: {}, voice language: {}",
        resource_path.display(),
        language
    );

    let clips = SoundFileStore::new(resource_path, language);
    let (events_tx, events_rx) = backend_channel();
    let backend = CpalBackend::new(args.device.as_deref(), events_tx)
        .context("Failed to open audio output")?;
    let sequencer = AdviceSequencer::new(clips, backend);

    let event_bus = Arc::new(EventBus::new(config.event_bus_capacity));
    let mut events = event_bus.subscribe();
    let (player, handle) = AdvicePlayer::new(sequencer, events_rx, Arc::clone(&event_bus));

    let advice_id = handle
        .play_advice(args.clips, AdvicePriority::from(args.priority))
        .context("Failed to submit advice")?;

    let timeout = Duration::from_secs(args.timeout_secs);
    let waiter = async {
        tokio::select! {
            result = tokio::time::timeout(timeout, wait_for_advice(&mut events, advice_id)) => {
                if result.is_err() {
                    warn!("Advice {} did not finish within {:?}", advice_id, timeout);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping");
            }
        }
        if let Err(e) = handle.shutdown() {
            error!("Failed to stop advice player: {}", e);
        }
    };

    tokio::join!(player.run(), waiter);

    info!("Advice player shutdown complete");
    Ok(())
}

/// Log player events until the given advice finishes or is dropped
async fn wait_for_advice(events: &mut broadcast::Receiver<NtkEvent>, advice_id: Uuid) {
    loop {
        match events.recv().await {
            Ok(event) => {
                info!("{}: {:?}", event.event_type(), event);
                match event {
                    NtkEvent::AdviceFinished { advice_id: id, .. }
                    | NtkEvent::AdviceDropped { advice_id: id, .. }
                        if id == advice_id =>
                    {
                        return;
                    }
                    _ => {}
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Missed {} player events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
