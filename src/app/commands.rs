//! Outbound device commands.
//!
//! The sensor head accepts a small fixed set of text commands, each
//! terminated by the telegram end delimiter.  Anything outside this set
//! is refused before it reaches the wire.

use core::fmt;
use core::str::FromStr;

use heapless::Vec;

use crate::error::CommandError;
use crate::telegram::END_DELIMITER;

/// Longest encoded command, delimiter included.
pub const MAX_COMMAND_LEN: usize = 16;

/// Commands the sensor head understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Restart the sensor head.
    Reset,
    /// Turn the buzzer on.
    BuzzerOn,
    /// Turn the buzzer off.
    BuzzerOff,
}

impl DeviceCommand {
    pub const ALL: [Self; 3] = [Self::Reset, Self::BuzzerOn, Self::BuzzerOff];

    /// Name callers use to request the command.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::BuzzerOn => "buzzer-on",
            Self::BuzzerOff => "buzzer-off",
        }
    }

    /// Text transmitted to the device (without delimiter).
    pub const fn wire_text(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::BuzzerOn => "buzz on",
            Self::BuzzerOff => "buzz off",
        }
    }

    /// Encode as `<wire text>#`.
    pub fn encode(self) -> Vec<u8, MAX_COMMAND_LEN> {
        let mut frame = Vec::new();
        // Longest wire text is 8 bytes; both pushes always fit.
        let _ = frame.extend_from_slice(self.wire_text().as_bytes());
        let _ = frame.push(END_DELIMITER);
        frame
    }
}

impl FromStr for DeviceCommand {
    type Err = CommandError;

    /// Accepts either the command name (`buzzer-on`) or its wire text
    /// (`buzz on`).  Matching is exact apart from surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s || c.wire_text() == s)
            .ok_or(CommandError::Invalid)
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
