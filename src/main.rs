//! flemlink: host entry point.
//!
//! Opens the board's serial port, seeds an in-memory store with the
//! control values given on the command line, pushes them to the board
//! and logs every reading until the link fails or the optional duration
//! elapses.
//!
//! ```text
//!  CLI args ─▶ MemoryStore ─▶ BridgeService ─▶ LogIngestionSink
//!                               │      ▲
//!                               ▼      │
//!                        SerialPortChannel ◀──▶ board
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{error, info, warn};
use serde_json::json;

use flemlink::adapters::log_sink::{LogEventSink, LogIngestionSink};
use flemlink::adapters::memory_store::MemoryStore;
use flemlink::adapters::serial::SerialPortChannel;
use flemlink::adapters::time::SystemClock;
use flemlink::app::service::BridgeService;
use flemlink::config::BridgeConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Bridge a FlemDuino board to the host state store")]
struct Args {
    /// JSON configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device, overrides the configuration file.
    #[arg(short, long)]
    port: Option<String>,

    /// Request the output on.
    #[arg(long)]
    on: bool,

    /// Current zone mean temperature (°C).
    #[arg(long)]
    mean: Option<f32>,

    /// Target temperature (°C).
    #[arg(long)]
    target: Option<f32>,

    /// Target hysteresis (°C).
    #[arg(long)]
    hysteresis: Option<f32>,

    /// Stop after this many seconds.
    #[arg(long)]
    duration_secs: Option<u64>,
}

fn load_config(args: &Args) -> Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => BridgeConfig::default(),
    };
    if let Some(port) = &args.port {
        config.serial.path.clone_from(port);
    }
    config.validate()?;
    Ok(config)
}

fn seed_store(config: &BridgeConfig, args: &Args) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.set(&config.switch.slice, &config.switch.field, json!(args.on));
    if let Some(mean) = args.mean {
        store.set(&config.current_mean.slice, &config.current_mean.field, json!(mean));
    }
    if let Some(target) = args.target {
        store.set(&config.target.slice, &config.target.field, json!(target));
    }
    if let Some(hysteresis) = args.hysteresis {
        store.set(&config.target.slice, &config.hysteresis_field, json!(hysteresis));
    }
    store
}

/// Instant at which the poll loop stops, if a duration was given.
fn deadline_after(now: Instant, duration_secs: Option<u64>) -> Result<Option<Instant>> {
    duration_secs
        .map(|secs| {
            now.checked_add(Duration::from_secs(secs))
                .ok_or_else(|| anyhow!("--duration-secs {} is out of range", secs))
        })
        .transpose()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("flemlink v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut store = seed_store(&config, &args);
    let mut ingest = LogIngestionSink::new();
    let mut events = LogEventSink::new();

    let mut bridge = BridgeService::new(&config, SerialPortChannel::new(), SystemClock);
    bridge
        .start(&mut store, &mut events)
        .with_context(|| format!("starting link on {}", config.serial.path))?;

    let deadline = deadline_after(Instant::now(), args.duration_secs)?;

    let outcome = loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break Ok(());
        }
        // The channel read timeout paces this loop.
        if let Err(e) = bridge.poll(&mut ingest, &mut events) {
            error!("link failed: {}", e);
            break Err(e);
        }
    };

    if let Err(e) = bridge.stop(&mut store, &mut events) {
        warn!("link close failed: {}", e);
    }
    info!("{} sample batches forwarded", ingest.batches());

    outcome.context("polling link")
}
