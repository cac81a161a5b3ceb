//! SkyGuard sky-condition monitor library.
//!
//! Reads `$...#` telegrams from a serial sky-quality sensor, decodes them
//! into [`SensorRecord`]s and answers one question: is it safe to keep the
//! observatory open right now?
//!
//! ```text
//!  serial bytes ──▶ telegram::TelegramFramer ──▶ telegram::decode
//!                                                     │
//!                     app::LinkSession ◀── latest record
//!                            │
//!                            └──▶ safety::evaluate ──▶ Safe / Unsafe
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod link;
pub mod safety;
pub mod telegram;

pub use app::commands::DeviceCommand;
pub use app::session::LinkSession;
pub use config::{LinkSettings, MonitorConfig};
pub use error::{Error, Result};
pub use link::LinkStatus;
pub use safety::{Assessment, SafetyVerdict, Thresholds, UnsafeReason};
pub use telegram::{SensorRecord, Telegram, TelegramFramer};
