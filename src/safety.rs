//! Safety evaluator.
//!
//! Turns the latest [`SensorRecord`] and the configured [`Thresholds`]
//! into a [`SafetyVerdict`].  The rules run in a fixed order and the first
//! one that trips decides the outcome:
//!
//! 1. humidity above `humidity_max`
//! 2. rain ratio above `rain_ratio_max`
//! 3. corrected sky temperature above `sky_temperature_max`
//! 4. sky or air temperature missing (sensor fault)
//! 5. no record at all
//!
//! Every missing or ambiguous input resolves to `Unsafe`.  The functions
//! here are pure: same record and thresholds, same answer.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::telegram::SensorRecord;

/// Limits and sky-temperature calibration used by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Relative humidity (%) above which conditions are unsafe.
    pub humidity_max: f32,
    /// Rain ratio above which rain is assumed.
    pub rain_ratio_max: f32,
    /// Corrected sky temperature (°C) above which the sky counts as cloudy.
    pub sky_temperature_max: f32,
    /// Linear gain applied to `air + offset` in the sky correction.
    pub sky_correction_gain: f32,
    /// Offset added to air temperature in the sky correction.
    pub sky_correction_offset: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            humidity_max: 90.0,
            rain_ratio_max: 1.2,
            sky_temperature_max: 0.0,
            sky_correction_gain: 0.33,
            sky_correction_offset: 4.0,
        }
    }
}

/// The answer to "is it safe to operate outdoor equipment right now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyVerdict {
    Safe,
    Unsafe,
}

impl SafetyVerdict {
    pub fn is_safe(self) -> bool {
        self == Self::Safe
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Unsafe => write!(f, "UNSAFE"),
        }
    }
}

/// Which rule made the verdict `Unsafe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsafeReason {
    /// The session is not connected.
    LinkDown,
    /// No telegram has been decoded since connecting.
    NoRecord,
    /// Humidity above the configured maximum.
    HumidityHigh,
    /// Rain ratio above the configured maximum.
    RainDetected,
    /// Corrected sky temperature above the configured maximum.
    SkyTooWarm,
    /// Sky or air temperature did not parse.
    SkySensorFault,
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkDown => write!(f, "link down"),
            Self::NoRecord => write!(f, "no telegram received"),
            Self::HumidityHigh => write!(f, "humidity above limit"),
            Self::RainDetected => write!(f, "rain detected"),
            Self::SkyTooWarm => write!(f, "sky temperature above limit"),
            Self::SkySensorFault => write!(f, "sky/air temperature unavailable"),
        }
    }
}

/// A verdict together with the reason behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub verdict: SafetyVerdict,
    /// Set exactly when `verdict` is `Unsafe`.
    pub reason: Option<UnsafeReason>,
    /// Corrected sky temperature, when it could be computed.
    pub corrected_sky: Option<f32>,
}

impl Assessment {
    pub const fn unsafe_because(reason: UnsafeReason) -> Self {
        Self {
            verdict: SafetyVerdict::Unsafe,
            reason: Some(reason),
            corrected_sky: None,
        }
    }

    const fn safe(corrected_sky: f32) -> Self {
        Self {
            verdict: SafetyVerdict::Safe,
            reason: None,
            corrected_sky: Some(corrected_sky),
        }
    }
}

/// Sky temperature corrected for the sensor's ambient-temperature drift:
/// `sky − (air + offset) × gain`.
pub fn corrected_sky_temperature(sky: f32, air: f32, thresholds: &Thresholds) -> f32 {
    sky - (air + thresholds.sky_correction_offset) * thresholds.sky_correction_gain
}

/// Evaluate a record against thresholds, keeping the deciding reason.
pub fn assess(record: Option<&SensorRecord>, thresholds: &Thresholds) -> Assessment {
    let Some(record) = record else {
        return Assessment::unsafe_because(UnsafeReason::NoRecord);
    };

    if record.humidity.is_some_and(|h| h > thresholds.humidity_max) {
        return Assessment::unsafe_because(UnsafeReason::HumidityHigh);
    }

    if record.rain_ratio.is_some_and(|r| r > thresholds.rain_ratio_max) {
        return Assessment::unsafe_because(UnsafeReason::RainDetected);
    }

    match (record.sky_temperature, record.air_temperature) {
        (Some(sky), Some(air)) => {
            let corrected = corrected_sky_temperature(sky, air, thresholds);
            if corrected > thresholds.sky_temperature_max {
                Assessment {
                    corrected_sky: Some(corrected),
                    ..Assessment::unsafe_because(UnsafeReason::SkyTooWarm)
                }
            } else {
                Assessment::safe(corrected)
            }
        }
        // One or both inputs missing: the correction cannot be computed.
        _ => Assessment::unsafe_because(UnsafeReason::SkySensorFault),
    }
}

/// Evaluate a record against thresholds.
pub fn evaluate(record: Option<&SensorRecord>, thresholds: &Thresholds) -> SafetyVerdict {
    assess(record, thresholds).verdict
}
