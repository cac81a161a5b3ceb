//! Outbound monitor events.
//!
//! [`LinkSession`](super::session::LinkSession) and its listener emit
//! these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: write to the
//! log, forward to a dashboard, etc.

use crate::safety::Assessment;
use crate::telegram::{FrameError, SensorRecord, Telegram};

use super::commands::DeviceCommand;

/// Structured events emitted by the monitor core.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The link opened and the listener is running.
    Connected { port: String },

    /// The link was closed by request.
    Disconnected,

    /// The listener's read failed; the session is now disconnected.
    LinkLost,

    /// A telegram was framed and decoded.
    TelegramAccepted {
        telegram: Telegram,
        record: SensorRecord,
    },

    /// A frame was discarded.
    TelegramRejected(FrameError),

    /// The verdict for the latest record changed.
    VerdictChanged(Assessment),

    /// A command was written to the link.
    CommandSent(DeviceCommand),
}
