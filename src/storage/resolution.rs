//! Time resolutions
//!
//! A [`Resolution`] is the number of seconds represented by one unit. The
//! named vocabulary covers the granularities used for storage and reporting;
//! `day` is the largest and defines the capacity of one storage segment.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Seconds per unit. Ordered by duration, so a greater resolution is coarser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(u32);

impl Resolution {
    /// Sentinel returned for unknown tokens
    pub const UNDEFINED: Resolution = Resolution(0);
    pub const SECOND: Resolution = Resolution(1);
    pub const MINUTE: Resolution = Resolution(60);
    pub const MINUTE_5: Resolution = Resolution(5 * 60);
    pub const MINUTE_15: Resolution = Resolution(15 * 60);
    pub const HOUR: Resolution = Resolution(60 * 60);
    pub const DAY: Resolution = Resolution(24 * 60 * 60);

    /// Create a resolution from a raw number of seconds (0 is undefined)
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Seconds per unit
    pub const fn secs(&self) -> i64 {
        self.0 as i64
    }

    pub fn is_defined(&self) -> bool {
        self.0 > 0
    }

    /// All named resolutions, finest first
    pub fn all() -> &'static [Resolution] {
        &[
            Resolution::SECOND,
            Resolution::MINUTE,
            Resolution::MINUTE_5,
            Resolution::MINUTE_15,
            Resolution::HOUR,
            Resolution::DAY,
        ]
    }

    /// Number of units in one day, or [`None`] if the day is not a whole multiple
    pub fn units_per_day(&self) -> Option<usize> {
        if self.is_defined() && Self::DAY.0 % self.0 == 0 {
            Some((Self::DAY.0 / self.0) as usize)
        } else {
            None
        }
    }

    /// Parse a human-readable token.
    ///
    /// Accepts the short and long form of every named resolution (`5m` and
    /// `5min`, `h` and `hour`, ...) and `<n>s` for an arbitrary number of
    /// seconds. Anything else yields [`Resolution::UNDEFINED`].
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "s" | "sec" => Self::SECOND,
            "m" | "min" => Self::MINUTE,
            "5m" | "5min" => Self::MINUTE_5,
            "15m" | "15min" => Self::MINUTE_15,
            "h" | "hour" => Self::HOUR,
            "d" | "day" => Self::DAY,
            other => other
                .strip_suffix('s')
                .and_then(|n| n.parse::<u32>().ok())
                .map(Self)
                .unwrap_or(Self::UNDEFINED),
        }
    }

    /// Canonical label, the inverse of [`Resolution::parse`]
    pub fn label(&self) -> String {
        match *self {
            Self::UNDEFINED => "undefined".to_string(),
            Self::SECOND => "sec".to_string(),
            Self::MINUTE => "min".to_string(),
            Self::MINUTE_5 => "5min".to_string(),
            Self::MINUTE_15 => "15min".to_string(),
            Self::HOUR => "hour".to_string(),
            Self::DAY => "day".to_string(),
            Self(secs) => format!("{}s", secs),
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MINUTE_5
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::parse(&token))
    }
}
