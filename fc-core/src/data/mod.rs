//! Data types, policy, and validation modules
//!
//! Everything needed to go from configuration text to a validated curve.

mod flags;
mod policy;
mod types;
mod validation;

pub use flags::{build_flags, build_flags_line, CurveFamily};
pub use policy::{HysteresisOrdering, RangeHandling, SpeedOrdering, ValidationPolicy};
pub use types::{CurveConfig, CurvePoint, FieldValue, Mode, PwmPolarity};
pub use validation::{
    load_config, parse_config, pwm_period_from_frequency, CurveConfigValidator,
};
