//! Port traits: the hexagonal boundary between the monitor core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LinkSession (domain)
//! ```
//!
//! Driven adapters (serial connector, event sinks, config storage)
//! implement these traits.  [`LinkSession`](super::session::LinkSession)
//! consumes them via generics or trait objects, so the core never touches
//! a real serial port directly.

use crate::config::{LinkSettings, MonitorConfig};
use crate::error::{ConfigError, LinkError};
use crate::link::transport::Transport;

use super::events::MonitorEvent;

// ───────────────────────────────────────────────────────────────
// Link connector (driven adapter: domain → serial hardware)
// ───────────────────────────────────────────────────────────────

/// Opens the physical link.
///
/// A successful open yields two halves of the same connection: the reader
/// is moved onto the listener thread, the writer stays with the session
/// for outbound commands.
pub trait Connector: Send {
    type Reader: Transport + Send + 'static;
    type Writer: Transport + Send;

    /// Open the link.  Failures map to [`LinkError::Unavailable`].
    fn open(&mut self, settings: &LinkSettings) -> Result<(Self::Reader, Self::Writer), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The session emits structured [`MonitorEvent`]s through this port,
/// from both the caller's thread and the listener thread.  Adapters
/// decide where they go.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &MonitorEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ config host)
// ───────────────────────────────────────────────────────────────

/// Loads and stores monitor configuration.
///
/// Implementations MUST validate before storing.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not clamped, so a
/// bad update can never disable a threshold (e.g. `humidityMax = 1e9`).
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`MonitorConfig::default()`] if nothing has been stored.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    /// Validate and store configuration.
    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}
