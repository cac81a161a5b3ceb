//! Delimited telegram framer.
//!
//! Wire format:
//! ```text
//! ┌─────┬─────────────────────────────────────┬─────┐
//! │ '$' │ body: comma-separated ASCII (≤ 39 B) │ '#' │
//! └─────┴─────────────────────────────────────┴─────┘
//! ```
//!
//! The framer is fed one byte at a time in arrival order and yields a
//! [`FrameResult`] whenever a frame boundary is reached.  Bytes outside a
//! frame are dropped, so the framer resynchronises on its own after line
//! noise or a device reset.  A `$` seen inside a body is kept as body data;
//! only `#` or an overflow ends a frame.

use core::fmt;

use heapless::Vec;

/// Byte that opens a telegram.
pub const START_DELIMITER: u8 = b'$';

/// Byte that closes a telegram (and terminates outbound commands).
pub const END_DELIMITER: u8 = b'#';

/// Longest body the device ever sends.  Anything longer is corrupt.
pub const MAX_TELEGRAM_LEN: usize = 39;

/// Framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingState {
    /// Discarding bytes until a start delimiter.
    AwaitingStart,
    /// Start delimiter seen, collecting body bytes.
    Accumulating,
}

/// Why a frame was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The body grew past [`MAX_TELEGRAM_LEN`] before the end delimiter.
    TooLong,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "telegram exceeds {MAX_TELEGRAM_LEN} bytes"),
        }
    }
}

/// One validated telegram body, without delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Telegram(Vec<u8, MAX_TELEGRAM_LEN>);

impl Telegram {
    /// Build a telegram from a body.  Returns `None` if it is too long.
    pub fn new(body: &[u8]) -> Option<Self> {
        Vec::from_slice(body).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii() && !b.is_ascii_control() {
                b as char
            } else {
                char::REPLACEMENT_CHARACTER
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

/// Outcome of a completed (or aborted) frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameResult {
    Accepted(Telegram),
    Rejected(FrameError),
}

/// Streaming telegram framer.
pub struct TelegramFramer {
    state: FramingState,
    buffer: Vec<u8, MAX_TELEGRAM_LEN>,
    /// Bytes dropped while waiting for a start delimiter.
    discarded: u64,
}

impl TelegramFramer {
    pub fn new() -> Self {
        Self {
            state: FramingState::AwaitingStart,
            buffer: Vec::new(),
            discarded: 0,
        }
    }

    /// Feed a single byte.
    ///
    /// Returns `Some` exactly when a frame boundary is reached: the end
    /// delimiter of a body that fits, or the first byte that would push
    /// the body past [`MAX_TELEGRAM_LEN`].  In both cases the framer is
    /// back in [`FramingState::AwaitingStart`] afterwards.
    pub fn feed(&mut self, byte: u8) -> Option<FrameResult> {
        match self.state {
            FramingState::AwaitingStart => {
                if byte == START_DELIMITER {
                    self.buffer.clear();
                    self.state = FramingState::Accumulating;
                } else {
                    self.discarded = self.discarded.saturating_add(1);
                }
                None
            }

            FramingState::Accumulating => {
                if byte == END_DELIMITER {
                    let telegram = Telegram(core::mem::take(&mut self.buffer));
                    self.state = FramingState::AwaitingStart;
                    return Some(FrameResult::Accepted(telegram));
                }

                if self.buffer.push(byte).is_err() {
                    // Overflow: drop the body and wait for the next '$'.
                    self.reset();
                    return Some(FrameResult::Rejected(FrameError::TooLong));
                }
                None
            }
        }
    }

    /// Feed a burst of bytes, invoking `on_frame` for every boundary.
    pub fn feed_slice(&mut self, data: &[u8], mut on_frame: impl FnMut(FrameResult)) {
        for &byte in data {
            if let Some(result) = self.feed(byte) {
                on_frame(result);
            }
        }
    }

    pub fn state(&self) -> FramingState {
        self.state
    }

    /// Number of body bytes collected so far in the current frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes discarded outside any frame since construction.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded
    }

    /// Drop any partial frame (e.g. after the link is reopened).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = FramingState::AwaitingStart;
    }
}

impl Default for TelegramFramer {
    fn default() -> Self {
        Self::new()
    }
}
