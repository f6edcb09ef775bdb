//! Validation strictness
//!
//! Two curve formats grew up side by side: the compact build-time format
//! (`1=20,5,30`) saturates out-of-range values, while the annotated install
//! format (`POINT_1=20C,5C,30%`) rejects them and demands strictly rising
//! curves. Both are kept as presets of one policy value instead of two parsers.

use serde::Serialize;

/// What to do with a value outside its physical range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeHandling {
    /// Saturate to the nearest bound
    Clamp,
    /// Fail validation
    Reject,
}

/// Ordering rule for the hysteresis temperature of consecutive points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HysteresisOrdering {
    /// `low[n] >= temperature[n-1]`
    AtLeastPreviousTemperature,
    /// `low[n] > low[n-1]`
    StrictlyAbovePreviousLow,
}

/// Ordering rule for the fan speed of consecutive points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedOrdering {
    NonDecreasing,
    StrictlyIncreasing,
}

/// Strictness knobs of the curve validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationPolicy {
    pub range: RangeHandling,
    pub hysteresis: HysteresisOrdering,
    pub fan_speed_order: SpeedOrdering,
    /// Lowest accepted fan speed in percent
    pub fan_speed_min: u8,
}

impl ValidationPolicy {
    /// Saturating policy of the compact build-time format
    pub const fn lenient() -> Self {
        Self {
            range: RangeHandling::Clamp,
            hysteresis: HysteresisOrdering::AtLeastPreviousTemperature,
            fan_speed_order: SpeedOrdering::NonDecreasing,
            fan_speed_min: 0,
        }
    }

    /// Rejecting policy of the annotated install-time format
    pub const fn strict() -> Self {
        Self {
            range: RangeHandling::Reject,
            hysteresis: HysteresisOrdering::StrictlyAbovePreviousLow,
            fan_speed_order: SpeedOrdering::StrictlyIncreasing,
            fan_speed_min: 1,
        }
    }

    /// Override the fan speed lower bound
    pub const fn with_fan_speed_min(mut self, min: u8) -> Self {
        self.fan_speed_min = min;
        self
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}
