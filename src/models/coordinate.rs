use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned EXIF rational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// A zero denominator is not trapped and yields inf/NaN.
    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Degrees, minutes and seconds as stored in the EXIF GPS block.
/// Components are never negative, the sign lives in [`Hemisphere`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmsCoordinate {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
}

impl DmsCoordinate {
    /// Build from the first three rationals of an EXIF GPS value
    pub fn from_rationals(values: &[Rational]) -> Option<Self> {
        match values {
            [degrees, minutes, seconds, ..] => Some(Self {
                degrees: *degrees,
                minutes: *minutes,
                seconds: *seconds,
            }),
            _ => None,
        }
    }

    pub fn to_rationals(&self) -> [Rational; 3] {
        [self.degrees, self.minutes, self.seconds]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    N,
    S,
    E,
    W,
}

impl Hemisphere {
    /// Parse an EXIF reference flag such as `"N"` or `"W\0"`
    pub fn from_ref(value: &str) -> Option<Self> {
        match value.trim_matches(|c: char| c == '\0' || c.is_whitespace()) {
            "N" => Some(Hemisphere::N),
            "S" => Some(Hemisphere::S),
            "E" => Some(Hemisphere::E),
            "W" => Some(Hemisphere::W),
            _ => None,
        }
    }

    pub fn latitude(decimal: f64) -> Self {
        if decimal >= 0.0 {
            Hemisphere::N
        } else {
            Hemisphere::S
        }
    }

    pub fn longitude(decimal: f64) -> Self {
        if decimal >= 0.0 {
            Hemisphere::E
        } else {
            Hemisphere::W
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Hemisphere::S | Hemisphere::W)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::N => "N",
            Hemisphere::S => "S",
            Hemisphere::E => "E",
            Hemisphere::W => "W",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecimalCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl DecimalCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validate that coordinates are within valid GPS ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A place to plot on the location map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub position: DecimalCoordinate,
}
