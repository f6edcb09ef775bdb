//! Core data types for pi-fanctl
//!
//! The validated configuration handed from the validator to the overlay
//! compiler and the build-flag emitter. A [`CurveConfig`] is only ever built by
//! the validator and is read-only afterwards.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{board, curve, paths, pwm};
use crate::identity::HostIdentity;

/// One knee of the fan curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    /// Temperature (°C) at which the fan steps up to `fan_speed`
    pub temperature: i8,
    /// Temperature (°C) at which the fan steps back down
    pub temperature_low: i8,
    /// Fan speed in percent
    pub fan_speed: u8,
}

/// PWM output polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PwmPolarity {
    #[default]
    #[serde(rename = "dir")]
    Direct,
    #[serde(rename = "inv")]
    Inverted,
}

impl PwmPolarity {
    /// Parse the configuration symbol (`dir` / `inv`)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "dir" => Some(Self::Direct),
            "inv" => Some(Self::Inverted),
            _ => None,
        }
    }
}

/// Renders the device-tree flag value
impl std::fmt::Display for PwmPolarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PwmPolarity::Direct => write!(f, "0"),
            PwmPolarity::Inverted => write!(f, "1"),
        }
    }
}

/// How the fan PWM signal leaves the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    /// PWM routed to the GPIO header pins
    #[default]
    #[serde(rename = "gpio")]
    GpioPins,
    /// Dedicated 4-pin fan connector (Raspberry Pi 5 only)
    #[serde(rename = "fanh")]
    FanHeader,
}

impl Mode {
    /// Parse the configuration symbol (`gpio` / `fanh`)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "gpio" => Some(Self::GpioPins),
            "fanh" => Some(Self::FanHeader),
            _ => None,
        }
    }

    /// Configuration symbol, also used as the template file suffix
    pub fn symbol(&self) -> &'static str {
        match self {
            Mode::GpioPins => "gpio",
            Mode::FanHeader => "fanh",
        }
    }

    /// Whether the mode can be used on the given board revision
    pub fn is_supported_on(&self, board_id: u32) -> bool {
        match self {
            Mode::GpioPins => true,
            Mode::FanHeader => board_id == board::RPI_5,
        }
    }

    /// Template for this mode: `<dir>/<driver>_<symbol>.dts.template`
    pub fn template_path(&self, template_dir: &Path, driver_name: &str) -> PathBuf {
        template_dir.join(format!(
            "{}_{}.{}",
            driver_name,
            self.symbol(),
            paths::TEMPLATE_EXTENSION
        ))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Value of a configuration field as seen by template placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<i64>),
}

/// Fully validated fan driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveConfig {
    board_id: u32,
    soc_name: String,
    mode: Mode,
    pwm_channel: u32,
    pwm_period: u32,
    pwm_polarity: PwmPolarity,
    control_period_ms: u32,
    points: [CurvePoint; curve::POINTS_NUM],
}

impl CurveConfig {
    pub(crate) fn new(
        identity: &HostIdentity,
        mode: Mode,
        pwm_period: u32,
        pwm_polarity: PwmPolarity,
        control_period_ms: u32,
        points: [CurvePoint; curve::POINTS_NUM],
    ) -> Self {
        let pwm_channel = if identity.is_rpi_5() {
            pwm::FAN_HEADER_CHANNEL
        } else {
            pwm::GPIO_CHANNEL
        };
        Self {
            board_id: identity.board_id,
            soc_name: identity.soc_name.clone(),
            mode,
            pwm_channel,
            pwm_period,
            pwm_polarity,
            control_period_ms,
            points,
        }
    }

    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    pub fn soc_name(&self) -> &str {
        &self.soc_name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pwm_channel(&self) -> u32 {
        self.pwm_channel
    }

    /// PWM period in nanoseconds
    pub fn pwm_period(&self) -> u32 {
        self.pwm_period
    }

    pub fn pwm_polarity(&self) -> PwmPolarity {
        self.pwm_polarity
    }

    pub fn control_period_ms(&self) -> u32 {
        self.control_period_ms
    }

    pub fn points(&self) -> &[CurvePoint; curve::POINTS_NUM] {
        &self.points
    }

    pub fn is_rpi_5(&self) -> bool {
        self.board_id == board::RPI_5
    }

    pub fn temperatures(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.temperature as i64).collect()
    }

    pub fn temperatures_hyst(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.temperature_low as i64).collect()
    }

    pub fn fan_speeds(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.fan_speed as i64).collect()
    }

    /// Look up a field by its lower-case name (placeholder resolution)
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let scalar = |v: &dyn std::fmt::Display| Some(FieldValue::Scalar(v.to_string()));
        match name {
            "board_id" => scalar(&self.board_id),
            "soc_name" => scalar(&self.soc_name),
            "mode" => scalar(&self.mode),
            "pwm_channel" => scalar(&self.pwm_channel),
            "pwm_period" => scalar(&self.pwm_period),
            "pwm_polarity" => scalar(&self.pwm_polarity),
            "control_period_ms" | "time_delay" => scalar(&self.control_period_ms),
            "temperatures" => Some(FieldValue::List(self.temperatures())),
            "temperatures_hyst" => Some(FieldValue::List(self.temperatures_hyst())),
            "fan_speeds" => Some(FieldValue::List(self.fan_speeds())),
            _ => None,
        }
    }
}
