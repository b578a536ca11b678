use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

pub mod config;
pub mod error;
pub mod heatmap;
mod internal_util;
pub mod map;
pub mod quality;
pub mod scan;

pub use config::HeatmapConfig;
pub use error::HeatmapError;
pub use heatmap::{HeatmapGridBuilder, HeatmapResult, SampleMarker, Statistics};
pub use map::{Measurement, MeasurementStore};
pub use quality::{classify, to_percent, Classification, ClassificationMode};

/// Marker used by the survey tools for a point that was measured without a reading.
pub const NO_SIGNAL_MARKER: &str = "N/A";

/// A signal-strength reading in dBm, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Signal {
    Dbm(f64),
    #[default]
    NoSignal,
}

impl Signal {
    /// The reading, if there is a finite one.
    pub fn dbm(&self) -> Option<f64> {
        match self {
            Self::Dbm(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.dbm().is_some()
    }

    /// Parse free-form input. Anything that is not a number becomes [`Signal::NoSignal`].
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case(NO_SIGNAL_MARKER) {
            return Self::NoSignal;
        }
        input.parse::<f64>().map_or(Self::NoSignal, Self::from)
    }

    /// Parse a manually typed reading.
    /// Only whole numbers in \[-100, 0\] dBm are accepted.
    pub fn from_manual_input(input: &str) -> Result<Self, HeatmapError> {
        let value = input
            .trim()
            .parse::<i32>()
            .map_err(|_| HeatmapError::InvalidManualReading(input.to_string()))?;
        if !(-100..=0).contains(&value) {
            return Err(HeatmapError::InvalidManualReading(input.to_string()));
        }
        Ok(Self::from(value))
    }
}

/// NaN and infinities are not readings.
impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            Self::NoSignal
        } else {
            Self::Dbm(value)
        }
    }
}

impl From<i32> for Signal {
    fn from(value: i32) -> Self {
        Self::Dbm(value as f64)
    }
}

impl From<Option<f64>> for Signal {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::NoSignal, Self::from)
    }
}

impl From<&str> for Signal {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dbm() {
            Some(value) => write!(f, "{} dBm", value),
            None => f.write_str(NO_SIGNAL_MARKER),
        }
    }
}

/// Identifier of a surveyed point.
/// Points placed freely on a floor plan have no location; points assigned to a
/// room grid carry the room name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId {
    pub location: Option<String>,
    pub name: String,
}

static LOCATION_SPLITTER: char = '/';
static ESCAPE: char = '\\';

impl PointId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            location: None,
            name: name.into(),
        }
    }

    pub fn located(location: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            name: name.into(),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, part: &str) -> fmt::Result {
    for c in part.chars() {
        if c == LOCATION_SPLITTER || c == ESCAPE {
            f.write_char(ESCAPE)?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

/// `location/name`, or just `name` for free points.
/// A `/` or `\` inside either part is escaped with `\`.
impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write_escaped(f, location)?;
            f.write_char(LOCATION_SPLITTER)?;
        }
        write_escaped(f, &self.name)
    }
}

impl FromStr for PointId {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HeatmapError::InvalidPointId(s.to_string());

        let mut parts = vec![String::new()];
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == LOCATION_SPLITTER {
                parts.push(String::new());
                continue;
            }
            let Some(part) = parts.last_mut() else {
                return Err(invalid());
            };
            if c == ESCAPE {
                match chars.next() {
                    Some(next) if next == LOCATION_SPLITTER || next == ESCAPE => part.push(next),
                    Some(next) => {
                        part.push(ESCAPE);
                        part.push(next);
                    }
                    None => return Err(invalid()),
                }
            } else {
                part.push(c);
            }
        }

        let id = match parts.as_slice() {
            [name] => Self::new(name.as_str()),
            [location, name] => Self::located(location.as_str(), name.as_str()),
            _ => return Err(invalid()),
        };
        if id.name.is_empty() || id.location.as_deref() == Some("") {
            return Err(invalid());
        }
        Ok(id)
    }
}
