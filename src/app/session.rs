//! Link session: the hexagonal core.
//!
//! [`LinkSession`] owns the link lifecycle and the shared pipeline state.
//! It exposes a hardware-agnostic API; all I/O flows through the
//! [`Connector`] and [`EventSink`] ports, making the whole session
//! testable with mock adapters.
//!
//! ```text
//!   Connector ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        LinkSession         │
//!   callers   ──▶ │ connect · verdict · send   │
//!                 └────────────────────────────┘
//! ```
//!
//! Every method takes `&self`, so a session can be shared between the
//! thread that polls the verdict and the one that sends commands.
//! Connect, disconnect and command writes are serialised by one lifecycle
//! lock; verdict queries never take it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::adapters::log_sink::LogEventSink;
use crate::config::{LinkSettings, MonitorConfig};
use crate::diagnostics::{COMMUNICATIONS, LinkStats};
use crate::error::{LinkError, Result};
use crate::link::LinkStatus;
use crate::link::listener::Listener;
use crate::link::shared::SharedState;
use crate::link::transport::write_all;
use crate::safety::{self, Assessment, SafetyVerdict, Thresholds, UnsafeReason};
use crate::telegram::SensorRecord;

use super::commands::DeviceCommand;
use super::events::MonitorEvent;
use super::ports::{Connector, EventSink};

// ───────────────────────────────────────────────────────────────
// LinkSession
// ───────────────────────────────────────────────────────────────

/// One monitored sensor link.
pub struct LinkSession<C: Connector> {
    lifecycle: Mutex<Lifecycle<C>>,
    shared: Arc<SharedState>,
    sink: Arc<dyn EventSink>,
}

struct Lifecycle<C: Connector> {
    connector: C,
    /// Settings used by [`LinkSession::connect`].
    settings: LinkSettings,
    active: Option<ActiveLink<C::Writer>>,
}

struct ActiveLink<W> {
    writer: W,
    listener: Listener,
}

impl<C: Connector> LinkSession<C> {
    /// Construct a disconnected session that logs its events.
    pub fn new(connector: C, config: &MonitorConfig) -> Self {
        Self::with_sink(connector, config, Arc::new(LogEventSink::new()))
    }

    /// Construct a disconnected session with a custom event sink.
    pub fn with_sink(connector: C, config: &MonitorConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            lifecycle: Mutex::new(Lifecycle {
                connector,
                settings: config.link_settings(),
                active: None,
            }),
            shared: Arc::new(SharedState::new(
                config.thresholds(),
                config.trace_enabled,
            )),
            sink,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open the configured link.
    pub fn connect(&self) -> Result<()> {
        let mut lc = self.lock_lifecycle();
        let settings = lc.settings.clone();
        self.open_locked(&mut lc, settings)
    }

    /// Open the link with explicit settings.  They become the session's
    /// settings for later [`connect`](Self::connect) calls.
    pub fn connect_with(&self, settings: LinkSettings) -> Result<()> {
        let mut lc = self.lock_lifecycle();
        lc.settings = settings.clone();
        self.open_locked(&mut lc, settings)
    }

    /// Close the link.  Calling this while disconnected does nothing.
    pub fn disconnect(&self) {
        let mut lc = self.lock_lifecycle();
        self.close_locked(&mut lc);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Send a command by name (`reset`, `buzzer-on`, `buzzer-off`).
    ///
    /// Unknown commands are refused without touching the link.
    pub fn send_command(&self, command: &str) -> Result<()> {
        let parsed = command.parse::<DeviceCommand>().inspect_err(|_| {
            warn!(target: COMMUNICATIONS, "refusing unknown command {:?}", command);
        })?;
        self.send(parsed)
    }

    /// Write a command to the device.  Not retried on failure.
    pub fn send(&self, command: DeviceCommand) -> Result<()> {
        let mut lc = self.lock_lifecycle();
        if self.shared.status() != LinkStatus::Connected {
            return Err(LinkError::NotConnected.into());
        }
        let Some(active) = lc.active.as_mut() else {
            return Err(LinkError::NotConnected.into());
        };

        let frame = command.encode();
        if let Err(e) = write_all(&mut active.writer, &frame) {
            warn!(target: COMMUNICATIONS, "command '{}' not sent: {:?}", command, e);
            return Err(LinkError::WriteFailed.into());
        }

        self.sink.emit(&MonitorEvent::CommandSent(command));
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> LinkStatus {
        self.shared.status()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == LinkStatus::Connected
    }

    /// Safety verdict for the latest record.  `Unsafe` unless connected.
    pub fn current_verdict(&self) -> SafetyVerdict {
        self.assessment().verdict
    }

    /// Like [`current_verdict`](Self::current_verdict), with the reason.
    pub fn assessment(&self) -> Assessment {
        if !self.is_connected() {
            return Assessment::unsafe_because(UnsafeReason::LinkDown);
        }
        safety::assess(self.shared.latest().as_ref(), &self.shared.thresholds())
    }

    /// The most recently decoded record, if any since connecting.
    pub fn latest_record(&self) -> Option<SensorRecord> {
        self.shared.latest()
    }

    /// Counters for the current connection.
    pub fn stats(&self) -> LinkStats {
        self.shared.counters.snapshot()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.shared.thresholds()
    }

    /// Settings the next [`connect`](Self::connect) will use.
    pub fn settings(&self) -> LinkSettings {
        self.lock_lifecycle().settings.clone()
    }

    // ── Configuration ─────────────────────────────────────────

    /// Replace the thresholds.  Applies to every evaluation from now on;
    /// verdicts already handed out are not revisited.
    pub fn set_thresholds(&self, thresholds: Thresholds) {
        self.shared.set_thresholds(thresholds);
        info!(
            target: COMMUNICATIONS,
            "thresholds updated: humidity>{} rain>{} sky>{} (gain {}, offset {})",
            thresholds.humidity_max,
            thresholds.rain_ratio_max,
            thresholds.sky_temperature_max,
            thresholds.sky_correction_gain,
            thresholds.sky_correction_offset,
        );
    }

    pub fn set_trace(&self, enabled: bool) {
        self.shared.set_trace(enabled);
    }

    /// Adopt a new configuration.  Thresholds and tracing take effect
    /// immediately; port and baud rate on the next connect.
    pub fn apply_config(&self, config: &MonitorConfig) {
        self.set_thresholds(config.thresholds());
        self.set_trace(config.trace_enabled);
        self.lock_lifecycle().settings = config.link_settings();
    }

    // ── Internal ──────────────────────────────────────────────

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle<C>> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn open_locked(&self, lc: &mut Lifecycle<C>, settings: LinkSettings) -> Result<()> {
        // Reconnecting replaces the previous link.
        self.close_locked(lc);

        self.shared.set_status(LinkStatus::Connecting);
        info!(
            target: COMMUNICATIONS,
            "opening {} at {} baud",
            settings.port,
            settings.baud_rate
        );

        let (reader, writer) = match lc.connector.open(&settings) {
            Ok(halves) => halves,
            Err(e) => {
                self.shared.set_status(LinkStatus::Disconnected);
                warn!(target: COMMUNICATIONS, "cannot open {}: {}", settings.port, e);
                return Err(e.into());
            }
        };

        // Nothing from a previous connection survives.
        self.shared.clear_record();
        self.shared.counters.reset();
        self.shared.set_status(LinkStatus::Connected);
        self.sink.emit(&MonitorEvent::Connected {
            port: settings.port.clone(),
        });

        match Listener::spawn(reader, Arc::clone(&self.shared), Arc::clone(&self.sink)) {
            Ok(listener) => {
                lc.active = Some(ActiveLink { writer, listener });
                Ok(())
            }
            Err(e) => {
                warn!(target: COMMUNICATIONS, "cannot start listener: {}", e);
                self.shared.set_status(LinkStatus::Disconnected);
                self.sink.emit(&MonitorEvent::Disconnected);
                Err(LinkError::Unavailable.into())
            }
        }
    }

    fn close_locked(&self, lc: &mut Lifecycle<C>) {
        let Some(active) = lc.active.take() else {
            return;
        };

        self.shared.set_status(LinkStatus::Disconnected);
        active.listener.stop();
        drop(active.writer);
        self.shared.clear_record();
        self.sink.emit(&MonitorEvent::Disconnected);
    }
}

impl<C: Connector> Drop for LinkSession<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
