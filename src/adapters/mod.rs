//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements        | Connects to                |
//! |-----------------|-------------------|----------------------------|
//! | `log_sink`      | EventSink         | `log` facade               |
//! | `memory_config` | ConfigPort        | In-memory postcard blob    |
//! | `serial`        | Connector         | Serial port (`serialport`) |
//! |                 | Transport         |                            |

pub mod log_sink;
pub mod memory_config;
#[cfg(feature = "serial")]
pub mod serial;
