//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing monitor events through the `log`
//! facade, on the `communications` and `values` targets.  Whatever logger
//! the host installs decides where they end up.

use log::{debug, info, warn};

use crate::app::events::MonitorEvent;
use crate::app::ports::EventSink;
use crate::diagnostics::{COMMUNICATIONS, VALUES};
use crate::safety::UnsafeReason;

/// Adapter that logs every [`MonitorEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Connected { port } => {
                info!(target: COMMUNICATIONS, "LINK  | connected to {}", port);
            }
            MonitorEvent::Disconnected => {
                info!(target: COMMUNICATIONS, "LINK  | disconnected");
            }
            MonitorEvent::LinkLost => {
                warn!(target: COMMUNICATIONS, "LINK  | lost, record cleared");
            }
            // Traced by the listener when tracing is enabled.
            MonitorEvent::TelegramAccepted { .. } => {}
            MonitorEvent::TelegramRejected(err) => {
                warn!(target: COMMUNICATIONS, "FRAME | rejected: {}", err);
            }
            MonitorEvent::VerdictChanged(a) => match a.reason {
                Some(UnsafeReason::SkySensorFault) => {
                    warn!(
                        target: VALUES,
                        "SAFE? | {} ({})",
                        a.verdict,
                        UnsafeReason::SkySensorFault
                    );
                }
                Some(reason) => {
                    info!(target: VALUES, "SAFE? | {} ({})", a.verdict, reason);
                }
                None => {
                    info!(
                        target: VALUES,
                        "SAFE? | {} | sky={:.2}\u{00b0}C",
                        a.verdict,
                        a.corrected_sky.unwrap_or(f32::NAN),
                    );
                }
            },
            MonitorEvent::CommandSent(cmd) => {
                debug!(target: COMMUNICATIONS, "CMD   | sent '{}'", cmd.wire_text());
            }
        }
    }
}
