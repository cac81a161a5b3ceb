//! SkyGuard host binary.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  SerialConnector   LogEventSink   MemoryConfigStore      │
//! │  (Connector)       (EventSink)    (ConfigPort)           │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ───────────────    │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          LinkSession (pure logic)                  │  │
//! │  │  Framer · Decoder · Safety evaluator               │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `skyguard [config.json] [key=value ...]`
//!
//! Lines typed on stdin are commands: `reset`, `buzzer-on`, `buzzer-off`,
//! `set key=value`, `stats`, `quit`.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

use skyguard::adapters::memory_config::MemoryConfigStore;
use skyguard::adapters::serial::SerialConnector;
use skyguard::app::ports::ConfigPort;
use skyguard::{LinkSession, MonitorConfig};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("SkyGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(std::env::args().skip(1))?;
    let store = Arc::new(MemoryConfigStore::new());
    store
        .save(&config)
        .map_err(|e| anyhow!("config rejected: {e}"))?;

    // ── 3. Session ────────────────────────────────────────────
    let session = Arc::new(LinkSession::new(SerialConnector::new(), &config));
    if let Err(e) = session.connect() {
        warn!("initial connect failed: {e}, retrying every {:?}", POLL_INTERVAL);
    }

    let running = Arc::new(AtomicBool::new(true));
    spawn_console(Arc::clone(&session), Arc::clone(&store), Arc::clone(&running))?;

    // ── 4. Supervisor loop ────────────────────────────────────
    let mut last = None;
    while running.load(Ordering::Acquire) {
        std::thread::sleep(POLL_INTERVAL);

        if !session.is_connected() && session.connect().is_err() {
            continue;
        }

        let assessment = session.assessment();
        if last != Some(assessment.verdict) {
            info!("verdict: {}", assessment.verdict);
            last = Some(assessment.verdict);
        }
    }

    session.disconnect();
    Ok(())
}

/// Build the configuration from an optional JSON file followed by
/// `key=value` overrides.
fn load_config(args: impl Iterator<Item = String>) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::default();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            config
                .apply(key, value)
                .map_err(|e| anyhow!("{key}: {e}"))?;
        } else {
            let text = std::fs::read_to_string(&arg)
                .with_context(|| format!("reading config file {arg}"))?;
            config = serde_json::from_str(&text)
                .map_err(|e| anyhow!("parsing config file {arg}: {e}"))?;
        }
    }

    config.validate().map_err(|e| anyhow!("{e}"))?;
    Ok(config)
}

fn spawn_console(
    session: Arc<LinkSession<SerialConnector>>,
    store: Arc<MemoryConfigStore>,
    running: Arc<AtomicBool>,
) -> Result<()> {
    std::thread::Builder::new()
        .name("skyguard-console".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if let Err(e) = handle_line(line.trim(), &session, &store, &running) {
                    warn!("{e}");
                }
                if !running.load(Ordering::Acquire) {
                    break;
                }
            }
        })
        .context("spawning console thread")?;
    Ok(())
}

fn handle_line(
    line: &str,
    session: &LinkSession<SerialConnector>,
    store: &MemoryConfigStore,
    running: &AtomicBool,
) -> Result<()> {
    match line {
        "" => {}
        "quit" | "exit" => running.store(false, Ordering::Release),
        "stats" => {
            let s = session.stats();
            info!(
                "status={:?} accepted={} rejected={} noise={}",
                session.status(),
                s.telegrams_accepted,
                s.telegrams_rejected,
                s.noise_bytes
            );
        }
        _ => {
            if let Some(assignment) = line.strip_prefix("set ") {
                let Some((key, value)) = assignment.split_once('=') else {
                    bail!("expected `set key=value`");
                };
                let mut config = store.load().map_err(|e| anyhow!("{e}"))?;
                let key = config
                    .apply(key.trim(), value)
                    .map_err(|e| anyhow!("{}: {e}", key.trim()))?;
                store.save(&config).map_err(|e| anyhow!("{e}"))?;
                if key.affects_thresholds() {
                    session.set_thresholds(config.thresholds());
                } else {
                    session.apply_config(&config);
                    info!("{key} takes effect on the next connect");
                }
            } else {
                session
                    .send_command(line)
                    .map_err(|e| anyhow!("{line}: {e}"))?;
            }
        }
    }
    Ok(())
}
