//! Monitor configuration parameters
//!
//! All tunable parameters for the SkyGuard monitor.  Keys serialise in
//! camelCase so they match the names used by the configuration host
//! (`humidityMax`, `portIdentifier`, ...).  Values can be replaced
//! wholesale or updated one key at a time via [`MonitorConfig::apply`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::safety::Thresholds;

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    // --- Thresholds ---
    /// Relative humidity (%) above which conditions are unsafe
    pub humidity_max: f32,
    /// Rain ratio above which rain is assumed
    pub rain_ratio_max: f32,
    /// Corrected sky temperature (°C) above which the sky is cloudy
    pub sky_temperature_max: f32,

    // --- Sky temperature calibration ---
    /// Gain applied to `air + offset`
    pub sky_correction_gain: f32,
    /// Offset added to air temperature
    pub sky_correction_offset: f32,

    // --- Link ---
    /// Serial port name (`COM1`, `/dev/ttyUSB0`, ...)
    pub port_identifier: String,
    /// Serial baud rate
    pub baud_rate: u32,

    // --- Diagnostics ---
    /// Log every decoded telegram on the `values` target
    pub trace_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            humidity_max: thresholds.humidity_max,
            rain_ratio_max: thresholds.rain_ratio_max,
            sky_temperature_max: thresholds.sky_temperature_max,

            sky_correction_gain: thresholds.sky_correction_gain,
            sky_correction_offset: thresholds.sky_correction_offset,

            port_identifier: String::from("COM1"),
            baud_rate: DEFAULT_BAUD_RATE,

            trace_enabled: false,
        }
    }
}

impl MonitorConfig {
    /// Thresholds for the safety evaluator.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            humidity_max: self.humidity_max,
            rain_ratio_max: self.rain_ratio_max,
            sky_temperature_max: self.sky_temperature_max,
            sky_correction_gain: self.sky_correction_gain,
            sky_correction_offset: self.sky_correction_offset,
        }
    }

    /// Serial settings for the configured port.
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            baud_rate: self.baud_rate,
            ..LinkSettings::new(self.port_identifier.clone())
        }
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.humidity_max) {
            return Err(ConfigError::ValidationFailed("humidityMax must be 0–100"));
        }
        if !(0.0..=100.0).contains(&self.rain_ratio_max) {
            return Err(ConfigError::ValidationFailed(
                "rainRatioMax must be 0–100",
            ));
        }
        if !(-100.0..=100.0).contains(&self.sky_temperature_max) {
            return Err(ConfigError::ValidationFailed(
                "skyTemperatureMax must be -100–100",
            ));
        }
        if !self.sky_correction_gain.is_finite() || !self.sky_correction_offset.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "sky correction gain/offset must be finite",
            ));
        }
        if self.port_identifier.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "portIdentifier must not be empty",
            ));
        }
        if !(300..=115_200).contains(&self.baud_rate) {
            return Err(ConfigError::ValidationFailed(
                "baudRate must be 300–115200",
            ));
        }
        Ok(())
    }

    /// Update a single key from its textual value.
    ///
    /// The config is left untouched if the key is unknown, the value does
    /// not parse, or the result fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<ConfigKey, ConfigError> {
        let key: ConfigKey = key.parse()?;
        let mut next = self.clone();
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue(key.as_str());

        match key {
            ConfigKey::HumidityMax => next.humidity_max = parse_f32(value).ok_or_else(invalid)?,
            ConfigKey::RainRatioMax => {
                next.rain_ratio_max = parse_f32(value).ok_or_else(invalid)?;
            }
            ConfigKey::SkyTemperatureMax => {
                next.sky_temperature_max = parse_f32(value).ok_or_else(invalid)?;
            }
            ConfigKey::SkyCorrectionGain => {
                next.sky_correction_gain = parse_f32(value).ok_or_else(invalid)?;
            }
            ConfigKey::SkyCorrectionOffset => {
                next.sky_correction_offset = parse_f32(value).ok_or_else(invalid)?;
            }
            ConfigKey::PortIdentifier => next.port_identifier = value.to_owned(),
            ConfigKey::BaudRate => next.baud_rate = value.parse().map_err(|_| invalid())?,
            ConfigKey::TraceEnabled => next.trace_enabled = parse_bool(value).ok_or_else(invalid)?,
        }

        next.validate()?;
        *self = next;
        Ok(key)
    }
}

fn parse_f32(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Configuration keys
// ---------------------------------------------------------------------------

/// Keys recognised by [`MonitorConfig::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    HumidityMax,
    RainRatioMax,
    SkyTemperatureMax,
    SkyCorrectionGain,
    SkyCorrectionOffset,
    PortIdentifier,
    BaudRate,
    TraceEnabled,
}

impl ConfigKey {
    pub const ALL: [Self; 8] = [
        Self::HumidityMax,
        Self::RainRatioMax,
        Self::SkyTemperatureMax,
        Self::SkyCorrectionGain,
        Self::SkyCorrectionOffset,
        Self::PortIdentifier,
        Self::BaudRate,
        Self::TraceEnabled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HumidityMax => "humidityMax",
            Self::RainRatioMax => "rainRatioMax",
            Self::SkyTemperatureMax => "skyTemperatureMax",
            Self::SkyCorrectionGain => "skyCorrectionGain",
            Self::SkyCorrectionOffset => "skyCorrectionOffset",
            Self::PortIdentifier => "portIdentifier",
            Self::BaudRate => "baudRate",
            Self::TraceEnabled => "traceEnabled",
        }
    }

    /// True for keys that feed the safety evaluator.
    pub const fn affects_thresholds(self) -> bool {
        matches!(
            self,
            Self::HumidityMax
                | Self::RainRatioMax
                | Self::SkyTemperatureMax
                | Self::SkyCorrectionGain
                | Self::SkyCorrectionOffset
        )
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or(ConfigError::UnknownKey)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Serial link settings
// ---------------------------------------------------------------------------

/// Baud rate the sensor head ships with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataBits {
    Seven,
    #[default]
    Eight,
}

/// Everything a [`Connector`](crate::app::ports::Connector) needs to open
/// the link.  Defaults match the sensor's wire format: 9600 8N1, no flow
/// control, DTR asserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    pub port: String,
    pub baud_rate: u32,
    pub parity: Parity,
    pub data_bits: DataBits,
    pub assert_dtr: bool,
}

impl LinkSettings {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            data_bits: DataBits::Eight,
            assert_dtr: true,
        }
    }
}
