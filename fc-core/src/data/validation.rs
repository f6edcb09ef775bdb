//! Fan curve configuration parsing and validation
//!
//! Turns the human-edited configuration text into a [`CurveConfig`]. Every
//! entry is checked as soon as it is read; the curve as a whole is checked once
//! the text is exhausted. Any failure aborts with the offending line or point.
//!
//! Accepted entries (one per line, any order, `#` starts a comment):
//!
//! ```text
//! P=500                    control period in ms (compact)
//! DELAY=500ms              control period in ms (annotated)
//! PWM_FREQ=25000Hz         PWM frequency
//! PWM_POL=dir|inv          PWM polarity
//! MODE=gpio|fanh           output mode
//! 1=20,5,30                point 1: 20°C, steps down 5°C lower, 30%
//! POINT_1=20C,5C,30%       same point, annotated
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::constants::{curve, pwm};
use crate::data::policy::{HysteresisOrdering, RangeHandling, SpeedOrdering, ValidationPolicy};
use crate::data::types::{CurveConfig, CurvePoint, Mode, PwmPolarity};
use crate::error::{FanctlError, Result};
use crate::identity::HostIdentity;

/// Point as read from the text, with the line it came from
#[derive(Debug, Clone, Copy)]
struct ExplicitPoint {
    point: CurvePoint,
    line: usize,
}

/// Raw values of a curve point entry before range handling
struct RawPoint {
    index: i64,
    temperature: i64,
    hysteresis: i64,
    fan_speed: i64,
}

/// Incremental configuration validator
///
/// Feed lines with [`feed_line`](Self::feed_line), then call
/// [`finish`](Self::finish) to obtain the dense curve.
#[derive(Debug)]
pub struct CurveConfigValidator<'a> {
    identity: &'a HostIdentity,
    policy: ValidationPolicy,
    mode: Mode,
    pwm_period: u32,
    pwm_polarity: PwmPolarity,
    control_period_ms: u32,
    points: [Option<ExplicitPoint>; curve::POINTS_NUM],
}

impl<'a> CurveConfigValidator<'a> {
    pub fn new(identity: &'a HostIdentity, policy: ValidationPolicy) -> Self {
        Self {
            identity,
            policy,
            mode: Mode::default(),
            pwm_period: pwm::DEFAULT_PERIOD_NS,
            pwm_polarity: PwmPolarity::default(),
            control_period_ms: pwm::DEFAULT_CONTROL_PERIOD_MS,
            points: [None; curve::POINTS_NUM],
        }
    }

    /// Process one line (`line_no` is 1-based and only used in diagnostics)
    pub fn feed_line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let invalid = || FanctlError::invalid_line(line_no, line);
        let (key, value) = line.split_once('=').ok_or_else(invalid)?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "P" => {
                let period = parse_int(value).ok_or_else(invalid)?;
                let period = self.bound("control period", period, 0, u32::MAX as i64)?;
                self.control_period_ms = period as u32;
            }
            "DELAY" => {
                let period = with_unit(value, "ms")
                    .and_then(|v| v.parse::<u32>().ok())
                    .ok_or_else(invalid)?;
                self.control_period_ms = period;
            }
            "PWM_FREQ" => {
                let frequency = with_unit(value, "Hz")
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|hz| *hz > 0)
                    .ok_or_else(invalid)?;
                self.pwm_period = pwm_period_from_frequency(frequency);
            }
            "PWM_POL" => {
                self.pwm_polarity = PwmPolarity::from_symbol(value).ok_or_else(invalid)?;
            }
            "MODE" => {
                let mode = Mode::from_symbol(value).ok_or_else(invalid)?;
                if !mode.is_supported_on(self.identity.board_id) {
                    return Err(FanctlError::UnsupportedMode {
                        mode: mode.to_string(),
                        board_id: self.identity.board_id,
                    });
                }
                self.mode = mode;
            }
            _ => {
                let raw_point = parse_compact_point(key, value)
                    .or_else(|| parse_annotated_point(key, value))
                    .ok_or_else(invalid)?;
                self.add_point(line_no, line, raw_point)?;
            }
        }

        trace!("Accepted config line {}: {}", line_no, line);
        Ok(())
    }

    fn add_point(&mut self, line_no: usize, line: &str, raw: RawPoint) -> Result<()> {
        if !(1..=curve::POINTS_NUM as i64).contains(&raw.index) {
            return Err(FanctlError::invalid_line(line_no, line));
        }
        let index = (raw.index - 1) as usize;
        if self.points[index].is_some() {
            return Err(FanctlError::DuplicatePoint { index: index + 1 });
        }

        let temperature = self.bound(
            "temperature",
            raw.temperature,
            curve::MIN_TEMPERATURE,
            curve::MAX_TEMPERATURE,
        )?;
        let offset = self.bound("hysteresis", raw.hysteresis, 0, i64::MAX)?;
        let temperature_low = self.bound(
            "hysteresis temperature",
            temperature.saturating_sub(offset),
            curve::MIN_TEMPERATURE,
            curve::MAX_TEMPERATURE,
        )?;
        let fan_speed = self.bound(
            "fan speed",
            raw.fan_speed,
            self.policy.fan_speed_min as i64,
            curve::MAX_FAN_SPEED,
        )?;

        let point = CurvePoint {
            temperature: temperature as i8,
            temperature_low: temperature_low as i8,
            fan_speed: fan_speed as u8,
        };

        // Neighbours by index, whatever order they arrived in
        if index > 0 {
            if let Some(prev) = self.points[index - 1] {
                self.check_order(&prev.point, &point, index + 1)?;
            }
        }
        if let Some(next) = self.points.get(index + 1).copied().flatten() {
            self.check_order(&point, &next.point, index + 2)?;
        }

        debug!("Curve point {} from line {}: {:?}", index + 1, line_no, point);
        self.points[index] = Some(ExplicitPoint { point, line: line_no });
        Ok(())
    }

    /// Check `cur` against the point right below it; `number` is `cur`'s 1-based index
    fn check_order(&self, prev: &CurvePoint, cur: &CurvePoint, number: usize) -> Result<()> {
        if cur.temperature <= prev.temperature {
            return Err(FanctlError::invalid_point(
                number,
                format!(
                    "temperature {} must be above {} of point {}",
                    cur.temperature,
                    prev.temperature,
                    number - 1
                ),
            ));
        }

        let hysteresis_ok = match self.policy.hysteresis {
            HysteresisOrdering::AtLeastPreviousTemperature => {
                cur.temperature_low >= prev.temperature
            }
            HysteresisOrdering::StrictlyAbovePreviousLow => {
                cur.temperature_low > prev.temperature_low
            }
        };
        if !hysteresis_ok {
            return Err(FanctlError::invalid_point(
                number,
                format!(
                    "hysteresis temperature {} overlaps point {}",
                    cur.temperature_low,
                    number - 1
                ),
            ));
        }

        let speed_ok = match self.policy.fan_speed_order {
            SpeedOrdering::NonDecreasing => cur.fan_speed >= prev.fan_speed,
            SpeedOrdering::StrictlyIncreasing => cur.fan_speed > prev.fan_speed,
        };
        if !speed_ok {
            return Err(FanctlError::invalid_point(
                number,
                format!(
                    "fan speed {}% is below {}% of point {}",
                    cur.fan_speed,
                    prev.fan_speed,
                    number - 1
                ),
            ));
        }

        Ok(())
    }

    /// Apply the range policy to `value`
    fn bound(&self, field: &str, value: i64, min: i64, max: i64) -> Result<i64> {
        match self.policy.range {
            RangeHandling::Clamp => Ok(value.clamp(min, max)),
            RangeHandling::Reject if (min..=max).contains(&value) => Ok(value),
            RangeHandling::Reject => Err(FanctlError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            }),
        }
    }

    /// Resolve the dense curve. Trailing unset points repeat the last set one;
    /// a set point after an unset one is an error.
    pub fn finish(self) -> Result<CurveConfig> {
        let first = self.points[0].ok_or(FanctlError::NoCurve)?;

        let mut resolved = [first.point; curve::POINTS_NUM];
        let mut missing: Vec<usize> = Vec::new();
        for index in 1..curve::POINTS_NUM {
            match self.points[index] {
                Some(explicit) => {
                    if !missing.is_empty() {
                        debug!(
                            "Point {} on line {} follows unset points",
                            index + 1,
                            explicit.line
                        );
                        return Err(FanctlError::MissingPoints(join_numbers(&missing)));
                    }
                    resolved[index] = explicit.point;
                }
                None => {
                    missing.push(index + 1);
                    resolved[index] = resolved[index - 1];
                }
            }
        }

        debug!(
            "Curve resolved: {} explicit point(s), mode {}, period {} ms",
            curve::POINTS_NUM - missing.len(),
            self.mode,
            self.control_period_ms
        );

        Ok(CurveConfig::new(
            self.identity,
            self.mode,
            self.pwm_period,
            self.pwm_polarity,
            self.control_period_ms,
            resolved,
        ))
    }
}

/// `max(1, 1e9 / hz)` in nanoseconds
pub fn pwm_period_from_frequency(frequency_hz: u64) -> u32 {
    (pwm::NANOS_PER_SECOND / frequency_hz.max(1)).max(1) as u32
}

/// Parse a whole configuration text
pub fn parse_config(
    text: &str,
    identity: &HostIdentity,
    policy: ValidationPolicy,
) -> Result<CurveConfig> {
    let mut validator = CurveConfigValidator::new(identity, policy);
    for (index, line) in text.lines().enumerate() {
        validator.feed_line(index + 1, line)?;
    }
    validator.finish()
}

/// Read and parse a configuration file
pub fn load_config(
    path: &Path,
    identity: &HostIdentity,
    policy: ValidationPolicy,
) -> Result<CurveConfig> {
    let text = fs::read_to_string(path).map_err(|e| FanctlError::read(path, e))?;
    debug!("Parsing fan config {:?} with {:?}", path, policy);
    parse_config(&text, identity, policy)
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Strip a mandatory unit suffix
fn with_unit<'v>(value: &'v str, unit: &str) -> Option<&'v str> {
    value.trim().strip_suffix(unit).map(str::trim)
}

/// `1=20,5,30`
fn parse_compact_point(key: &str, value: &str) -> Option<RawPoint> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parts: Vec<&str> = value.split(',').collect();
    let [temperature, hysteresis, fan_speed] = parts.as_slice() else {
        return None;
    };
    Some(RawPoint {
        index: parse_int(key)?,
        temperature: parse_int(temperature)?,
        hysteresis: parse_int(hysteresis)?,
        fan_speed: parse_int(fan_speed)?,
    })
}

/// `POINT_1=20C,5C,30%`
fn parse_annotated_point(key: &str, value: &str) -> Option<RawPoint> {
    let index = key.strip_prefix("POINT_")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parts: Vec<&str> = value.split(',').collect();
    let [temperature, hysteresis, fan_speed] = parts.as_slice() else {
        return None;
    };
    Some(RawPoint {
        index: parse_int(index)?,
        temperature: parse_int(with_unit(temperature, "C")?)?,
        hysteresis: parse_int(with_unit(hysteresis, "C")?)?,
        fan_speed: parse_int(with_unit(fan_speed, "%")?)?,
    })
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi4() -> HostIdentity {
        HostIdentity::new(4, "bcm2711")
    }

    fn pi5() -> HostIdentity {
        HostIdentity::new(5, "bcm2712")
    }

    fn lenient(text: &str) -> Result<CurveConfig> {
        parse_config(text, &pi4(), ValidationPolicy::lenient())
    }

    fn strict(text: &str) -> Result<CurveConfig> {
        parse_config(text, &pi4(), ValidationPolicy::strict())
    }

    fn point(temperature: i8, temperature_low: i8, fan_speed: u8) -> CurvePoint {
        CurvePoint {
            temperature,
            temperature_low,
            fan_speed,
        }
    }

    #[test]
    fn test_compact_example() {
        let config = lenient("P=500\n1=20,5,30\n2=40,2,60\n").unwrap();
        assert_eq!(config.control_period_ms(), 500);
        assert_eq!(config.points()[0], point(20, 15, 30));
        assert_eq!(config.points()[1], point(40, 38, 60));
        for p in &config.points()[2..] {
            assert_eq!(*p, point(40, 38, 60));
        }
    }

    #[test]
    fn test_annotated_example() {
        let text = "\
# fan curve
MODE=gpio
DELAY=2000ms
PWM_FREQ=25000Hz
PWM_POL=inv

POINT_1=45C,5C,20%
POINT_2=55C,5C,50%
POINT_3=65C,5C,100%
";
        let config = strict(text).unwrap();
        assert_eq!(config.mode(), Mode::GpioPins);
        assert_eq!(config.control_period_ms(), 2000);
        assert_eq!(config.pwm_period(), 40_000);
        assert_eq!(config.pwm_polarity(), PwmPolarity::Inverted);
        assert_eq!(config.points()[2], point(65, 60, 100));
        assert_eq!(config.points()[7], point(65, 60, 100));
    }

    #[test]
    fn test_defaults() {
        let config = strict("POINT_1=50C,5C,40%").unwrap();
        assert_eq!(config.mode(), Mode::GpioPins);
        assert_eq!(config.pwm_period(), pwm::DEFAULT_PERIOD_NS);
        assert_eq!(config.pwm_polarity(), PwmPolarity::Direct);
        assert_eq!(config.control_period_ms(), pwm::DEFAULT_CONTROL_PERIOD_MS);
        assert_eq!(config.pwm_channel(), pwm::GPIO_CHANNEL);
    }

    #[test]
    fn test_missing_first_point_always_fails() {
        assert!(matches!(lenient("P=100"), Err(FanctlError::NoCurve)));
        assert!(matches!(lenient(""), Err(FanctlError::NoCurve)));
        assert!(matches!(lenient("2=40,2,60"), Err(FanctlError::NoCurve)));
        assert!(matches!(
            strict("POINT_3=40C,2C,60%"),
            Err(FanctlError::NoCurve)
        ));
    }

    #[test]
    fn test_gap_is_rejected() {
        let err = lenient("1=20,5,30\n3=40,2,60\n").unwrap_err();
        assert!(matches!(err, FanctlError::MissingPoints(ref m) if m == "2"));

        let err = lenient("1=20,5,30\n4=40,2,60\n").unwrap_err();
        assert!(matches!(err, FanctlError::MissingPoints(ref m) if m == "2, 3"));
    }

    #[test]
    fn test_out_of_order_arrival_is_checked_by_index() {
        let config = lenient("2=40,2,60\n1=20,5,30\n").unwrap();
        assert_eq!(config.points()[1], point(40, 38, 60));

        // point 2 below point 1, caught when point 1 arrives
        let err = lenient("2=10,0,60\n1=20,5,30\n").unwrap_err();
        assert!(matches!(err, FanctlError::InvalidPoint { index: 2, .. }));
    }

    #[test]
    fn test_lenient_clamping() {
        let config = lenient("1=200,0,150").unwrap();
        assert_eq!(config.points()[0], point(127, 127, 100));

        let config = lenient("1=-200,0,-5").unwrap();
        assert_eq!(config.points()[0], point(-128, -128, 0));

        // negative hysteresis offset counts as zero, low end saturates
        let err = lenient("1=20,-7,30\n2=40,300,60").unwrap_err();
        assert!(matches!(err, FanctlError::InvalidPoint { index: 2, .. }));
        let config = lenient("1=20,-7,30").unwrap();
        assert_eq!(config.points()[0], point(20, 20, 30));
        let config = lenient("1=-100,100,30").unwrap();
        assert_eq!(config.points()[0], point(-100, -128, 30));

        let config = lenient("P=-10\n1=20,5,30").unwrap();
        assert_eq!(config.control_period_ms(), 0);
    }

    #[test]
    fn test_strict_rejects_out_of_range() {
        assert!(matches!(
            strict("1=20,10,150"),
            Err(FanctlError::OutOfRange { ref field, value: 150, .. }) if field == "fan speed"
        ));
        assert!(matches!(
            strict("POINT_1=128C,0C,50%"),
            Err(FanctlError::OutOfRange { .. })
        ));
        assert!(matches!(
            strict("POINT_1=20C,0C,0%"),
            Err(FanctlError::OutOfRange { min: 1, .. })
        ));
        assert!(matches!(
            strict("POINT_1=-100C,100C,10%"),
            Err(FanctlError::OutOfRange { .. })
        ));
        assert!(matches!(strict("P=-1\n1=20,5,30"), Err(FanctlError::OutOfRange { .. })));
    }

    #[test]
    fn test_fan_speed_minimum_is_configurable() {
        let policy = ValidationPolicy::strict().with_fan_speed_min(0);
        let config = parse_config("POINT_1=20C,0C,0%", &pi4(), policy).unwrap();
        assert_eq!(config.points()[0].fan_speed, 0);
    }

    #[test]
    fn test_temperature_must_increase() {
        let err = lenient("1=40,5,30\n2=40,2,60").unwrap_err();
        assert!(matches!(err, FanctlError::InvalidPoint { index: 2, .. }));
    }

    #[test]
    fn test_hysteresis_ordering_per_policy() {
        // low of point 2 (35) falls below temperature of point 1 (40)
        let text = "1=40,5,30\n2=50,15,60";
        assert!(lenient(text).is_err());

        // 45 >= 40 passes lenient; low 45 > 35 passes strict too
        let text = "1=40,5,30\n2=50,5,60";
        assert!(lenient(text).is_ok());
        assert!(strict(text).is_ok());

        // both lows are 40: strict wants them rising, lenient only compares with temperature
        let text = "1=40,0,30\n2=50,10,60";
        assert!(lenient(text).is_ok());
        assert!(strict(text).is_err());
    }

    #[test]
    fn test_fan_speed_ordering_per_policy() {
        let text = "1=40,0,60\n2=50,0,60";
        assert!(lenient(text).is_ok());
        assert!(strict(text).is_err());

        let text = "1=40,0,60\n2=50,0,50";
        assert!(lenient(text).is_err());
    }

    #[test]
    fn test_fill_is_idempotent_for_full_curve() {
        let text: String = (1..=8)
            .map(|i| format!("{}={},{},{}\n", i, i * 10, 2, i * 10))
            .collect();
        let config = lenient(&text).unwrap();
        for (i, p) in config.points().iter().enumerate() {
            let n = (i + 1) as i8;
            assert_eq!(*p, point(n * 10, n * 10 - 2, (n * 10) as u8));
        }
        let temps = config.temperatures();
        assert!(temps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_lines() {
        for text in [
            "garbage",
            "X=1",
            "9=20,5,30",
            "0=20,5,30",
            "1=20,5",
            "1=a,5,30",
            "POINT_1=20,5C,30%",
            "DELAY=100",
            "DELAY=-100ms",
            "PWM_FREQ=0Hz",
            "PWM_POL=up",
            "MODE=pwm",
        ] {
            assert!(
                matches!(lenient(text), Err(FanctlError::InvalidLine { line: 1, .. })),
                "expected invalid line for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_duplicate_point() {
        let err = lenient("1=20,5,30\n1=25,5,30").unwrap_err();
        assert!(matches!(err, FanctlError::DuplicatePoint { index: 1 }));
    }

    #[test]
    fn test_fan_header_mode_needs_pi5() {
        let err = strict("MODE=fanh\nPOINT_1=20C,5C,30%").unwrap_err();
        assert!(matches!(err, FanctlError::UnsupportedMode { board_id: 4, .. }));

        let config =
            parse_config("MODE=fanh\nPOINT_1=20C,5C,30%", &pi5(), ValidationPolicy::strict())
                .unwrap();
        assert_eq!(config.mode(), Mode::FanHeader);
        assert_eq!(config.pwm_channel(), pwm::FAN_HEADER_CHANNEL);
    }

    #[test]
    fn test_pwm_period_conversion() {
        assert_eq!(pwm_period_from_frequency(50_000), 20_000);
        assert_eq!(pwm_period_from_frequency(3), 333_333_333);
        assert_eq!(pwm_period_from_frequency(2_000_000_000), 1);
    }

    #[test]
    fn test_error_names_line() {
        let err = lenient("1=20,5,30\n\n# comment\nbogus line").unwrap_err();
        assert_eq!(err.to_string(), "Invalid line 4 in config: bogus line");
    }
}
