//! Positional telegram decoder.
//!
//! A telegram body carries seven comma-separated decimal fields in a fixed
//! order.  Every field is parsed on its own: a bad field becomes `None`
//! and never affects its neighbours, so a record is always produced.

use serde::{Deserialize, Serialize};

use super::framer::Telegram;

/// Separator between fields inside a telegram body.
pub const FIELD_DELIMITER: u8 = b',';

/// Number of positional fields in a telegram.
pub const FIELD_COUNT: usize = 7;

/// One decoded telegram.  `None` marks a field that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Air temperature (°C).
    pub air_temperature: Option<f32>,
    /// Relative humidity (%).
    pub humidity: Option<f32>,
    /// Barometric pressure (hPa).
    pub pressure: Option<f32>,
    /// Raw infrared sky temperature (°C).
    pub sky_temperature: Option<f32>,
    /// Sensor-head ambient temperature (°C).
    pub ambient_temperature: Option<f32>,
    /// Sky brightness (mag/arcsec²).
    pub sky_magnitude: Option<f32>,
    /// Rain sensor ratio (unitless).
    pub rain_ratio: Option<f32>,
}

impl SensorRecord {
    /// Build a record from fields in wire order.
    pub const fn from_fields(f: [Option<f32>; FIELD_COUNT]) -> Self {
        Self {
            air_temperature: f[0],
            humidity: f[1],
            pressure: f[2],
            sky_temperature: f[3],
            ambient_temperature: f[4],
            sky_magnitude: f[5],
            rain_ratio: f[6],
        }
    }

    /// Fields in wire order.
    pub const fn fields(&self) -> [Option<f32>; FIELD_COUNT] {
        [
            self.air_temperature,
            self.humidity,
            self.pressure,
            self.sky_temperature,
            self.ambient_temperature,
            self.sky_magnitude,
            self.rain_ratio,
        ]
    }

    /// How many of the seven fields parsed.
    pub fn parsed_count(&self) -> usize {
        self.fields().iter().filter(|f| f.is_some()).count()
    }
}

/// Decode a telegram body into a [`SensorRecord`].
///
/// Missing trailing fields decode as `None`; fields past the seventh are
/// ignored.
pub fn decode(telegram: &Telegram) -> SensorRecord {
    let mut fields = [None; FIELD_COUNT];
    for (slot, raw) in fields
        .iter_mut()
        .zip(telegram.as_bytes().split(|&b| b == FIELD_DELIMITER))
    {
        *slot = parse_field(raw);
    }
    SensorRecord::from_fields(fields)
}

/// Parse one ASCII decimal field.  Non-finite values count as unparsable
/// so that a stray `NaN` can never slip past a threshold comparison.
fn parse_field(raw: &[u8]) -> Option<f32> {
    let text = core::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f32>().ok().filter(|v| v.is_finite())
}
