//! Compiler flags for building the driver with a baked-in curve
//!
//! Emits `-DCURVE_TEMPERATURES="..."`, `-DCURVE_TEMPERATURES_HYST="..."`,
//! `-DCURVE_FAN_SPEEDS="..."` and, for a positive control period,
//! `-DCONTROL_PERIOD_MS=<n>`.

use crate::data::types::CurveConfig;

/// The three per-point curve families, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFamily {
    Temperature,
    TemperatureHyst,
    FanSpeed,
}

impl CurveFamily {
    pub const ALL: [CurveFamily; 3] = [
        CurveFamily::Temperature,
        CurveFamily::TemperatureHyst,
        CurveFamily::FanSpeed,
    ];

    /// Macro name understood by the driver sources
    pub fn define_name(&self) -> &'static str {
        match self {
            CurveFamily::Temperature => "CURVE_TEMPERATURES",
            CurveFamily::TemperatureHyst => "CURVE_TEMPERATURES_HYST",
            CurveFamily::FanSpeed => "CURVE_FAN_SPEEDS",
        }
    }

    pub fn values(&self, config: &CurveConfig) -> Vec<i64> {
        match self {
            CurveFamily::Temperature => config.temperatures(),
            CurveFamily::TemperatureHyst => config.temperatures_hyst(),
            CurveFamily::FanSpeed => config.fan_speeds(),
        }
    }
}

/// All flags as separate tokens
pub fn build_flags(config: &CurveConfig) -> Vec<String> {
    let mut flags: Vec<String> = CurveFamily::ALL
        .iter()
        .map(|family| {
            let values = family
                .values(config)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",");
            format!("-D{}=\"{}\"", family.define_name(), values)
        })
        .collect();

    if config.control_period_ms() > 0 {
        flags.push(format!("-DCONTROL_PERIOD_MS={}", config.control_period_ms()));
    }
    flags
}

/// Flags joined into the single line printed for the build
pub fn build_flags_line(config: &CurveConfig) -> String {
    build_flags(config).join(" ")
}
