use std::f64::consts::PI;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::orbital::error::ElementSetError;

pub const TLE_LINE_WIDTH: usize = 69;
/// Line 2 columns of the mean anomaly, degrees, `%8.4f`.
pub const MEAN_ANOMALY_COLUMNS: Range<usize> = 43..51;
/// Line 2 columns of the mean motion, revolutions per day.
pub const MEAN_MOTION_COLUMNS: Range<usize> = 52..63;
const CHECKSUM_COLUMN: usize = 68;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Earth gravitational parameter, km³/s².
pub const MU_EARTH_KM3_S2: f64 = 398_600.441_8;

/// Two-line element set with the fields the engine touches pre-parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSet {
    name: Option<String>,
    line1: String,
    line2: String,
    #[serde(skip)]
    mean_motion: f64,
    #[serde(skip)]
    mean_anomaly: f64,
}

impl ElementSet {
    pub fn new(
        name: Option<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Result<Self, ElementSetError> {
        let line1 = line1.into();
        let line2 = line2.into();
        check_line(&line1, 1)?;
        check_line(&line2, 2)?;
        let mean_motion: f64 = parse_field(&line2, MEAN_MOTION_COLUMNS, "mean motion")?;
        if !(mean_motion > 0.0) {
            return Err(ElementSetError::NonPositiveMeanMotion(mean_motion));
        }
        let mean_anomaly = parse_field(&line2, MEAN_ANOMALY_COLUMNS, "mean anomaly")?;
        Ok(Self {
            name: name.filter(|n| !n.is_empty()),
            line1,
            line2,
            mean_motion,
            mean_anomaly,
        })
    }

    /// Parses a 2- or 3-line record; surrounding whitespace and blank lines
    /// are ignored.
    pub fn parse(text: &str) -> Result<Self, ElementSetError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        match lines.as_slice() {
            [line1, line2] => Self::new(None, *line1, *line2),
            [name, line1, line2] => Self::new(Some(name.to_string()), *line1, *line2),
            other => Err(ElementSetError::LineCount(other.len())),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    pub fn mean_motion_rev_per_day(&self) -> f64 {
        self.mean_motion
    }

    pub fn mean_anomaly_deg(&self) -> f64 {
        self.mean_anomaly
    }

    pub fn period_s(&self) -> f64 {
        SECONDS_PER_DAY / self.mean_motion
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Copy with the mean anomaly field of line 2 rewritten.
    ///
    /// The value is wrapped into `[0, 360)` and written right-aligned as
    /// `%8.4f`; one that rounds to `360.0000` is written as `0.0000`. No other
    /// column changes, the checksum included.
    pub fn with_mean_anomaly(&self, degrees: f64) -> Result<Self, ElementSetError> {
        if !degrees.is_finite() {
            return Err(ElementSetError::NonFinite("mean anomaly"));
        }
        let mut value = wrap_degrees(degrees);
        if (value * 1e4).round() / 1e4 >= 360.0 {
            value = 0.0;
        }
        let field = format!("{:8.4}", value);
        let mut line2 = self.line2.clone();
        line2.replace_range(MEAN_ANOMALY_COLUMNS, &field);
        Self::new(self.name.clone(), self.line1.clone(), line2)
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "{}", name)?;
        }
        writeln!(f, "{}", self.line1)?;
        write!(f, "{}", self.line2)
    }
}

fn check_line(line: &str, number: u8) -> Result<(), ElementSetError> {
    if !line.is_ascii() {
        return Err(ElementSetError::NonAscii(number));
    }
    if line.len() != TLE_LINE_WIDTH {
        return Err(ElementSetError::WrongWidth {
            line: number,
            expected: TLE_LINE_WIDTH,
            actual: line.len(),
        });
    }
    if !line.starts_with(&format!("{} ", number)) {
        return Err(ElementSetError::LineNumber { line: number });
    }
    Ok(())
}

fn parse_field(line: &str, columns: Range<usize>, field: &'static str) -> Result<f64, ElementSetError> {
    let raw = &line[columns];
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ElementSetError::Field {
            field,
            value: raw.to_string(),
        })
}

fn wrap_degrees(value: f64) -> f64 {
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds up to the modulus, and of an
    // exact negative multiple returns -0.0
    if wrapped >= 360.0 || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Mean anomaly of a satellite trailing `leader` by `separation_s` seconds
/// on the same orbit, degrees in `[0, 360)`.
pub fn shift_mean_anomaly(leader: &ElementSet, separation_s: f64) -> Result<f64, ElementSetError> {
    if !separation_s.is_finite() {
        return Err(ElementSetError::NonFinite("separation"));
    }
    let fraction = separation_s / leader.period_s();
    Ok(wrap_degrees(leader.mean_anomaly_deg() - fraction * 360.0))
}

/// Element set of a virtual satellite trailing `leader` by `separation_s`.
pub fn follower(
    leader: &ElementSet,
    name: impl Into<String>,
    separation_s: f64,
) -> Result<ElementSet, ElementSetError> {
    let anomaly = shift_mean_anomaly(leader, separation_s)?;
    Ok(leader.with_mean_anomaly(anomaly)?.with_name(name))
}

/// Modulo-10 line checksum: digits count their value, minus signs count one.
pub fn tle_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(CHECKSUM_COLUMN)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// Copy of `line` with its checksum column recomputed.
pub fn with_valid_checksum(line: &str) -> String {
    if line.len() != TLE_LINE_WIDTH || !line.is_ascii() {
        return line.to_string();
    }
    let mut fixed = line[..CHECKSUM_COLUMN].to_string();
    fixed.push(char::from(b'0' + tle_checksum(line)));
    fixed
}

/// Semi-major axis of a circular orbit with the given period, km.
pub fn circular_semi_major_axis_km(period_s: f64) -> f64 {
    (MU_EARTH_KM3_S2 * period_s * period_s / (4.0 * PI * PI)).cbrt()
}

pub fn circular_speed_km_s(period_s: f64) -> f64 {
    2.0 * PI * circular_semi_major_axis_km(period_s) / period_s
}

/// Along-track time gap matching a distance gap, assuming a circular orbit.
pub fn separation_time_for_distance(period_s: f64, distance_km: f64) -> f64 {
    distance_km / circular_speed_km_s(period_s)
}

pub fn distance_for_separation_time(period_s: f64, separation_s: f64) -> f64 {
    separation_s * circular_speed_km_s(period_s)
}
