//! Telegram pipeline: byte framing and positional decoding.
//!
//! ```text
//!  raw bytes ──▶ TelegramFramer ──▶ Telegram ──▶ decode() ──▶ SensorRecord
//! ```

pub mod decoder;
pub mod framer;

pub use decoder::{FIELD_COUNT, FIELD_DELIMITER, SensorRecord, decode};
pub use framer::{
    END_DELIMITER, FrameError, FrameResult, FramingState, MAX_TELEGRAM_LEN, START_DELIMITER,
    Telegram, TelegramFramer,
};
