//! Time units and their scale in femtoseconds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TimeError;

const FS_PER_SEC: i128 = 1_000_000_000_000_000;

/// A unit of virtual time, ordered from coarsest to finest.
///
/// A year is fixed at 365 days. Every coarser unit is an integer multiple of
/// every finer one, so conversions towards finer units are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Y,
    D,
    H,
    Min,
    S,
    Ms,
    Us,
    Ns,
    Ps,
    Fs,
}

impl TimeUnit {
    /// All units, coarsest first.
    pub const ALL: [TimeUnit; 10] = [
        TimeUnit::Y,
        TimeUnit::D,
        TimeUnit::H,
        TimeUnit::Min,
        TimeUnit::S,
        TimeUnit::Ms,
        TimeUnit::Us,
        TimeUnit::Ns,
        TimeUnit::Ps,
        TimeUnit::Fs,
    ];

    /// Length of one unit in femtoseconds.
    pub const fn femtos(self) -> i128 {
        match self {
            TimeUnit::Y => 365 * 86_400 * FS_PER_SEC,
            TimeUnit::D => 86_400 * FS_PER_SEC,
            TimeUnit::H => 3_600 * FS_PER_SEC,
            TimeUnit::Min => 60 * FS_PER_SEC,
            TimeUnit::S => FS_PER_SEC,
            TimeUnit::Ms => 1_000_000_000_000,
            TimeUnit::Us => 1_000_000_000,
            TimeUnit::Ns => 1_000_000,
            TimeUnit::Ps => 1_000,
            TimeUnit::Fs => 1,
        }
    }

    /// Short suffix used in literals and display (`"ms"`, `"min"`, ...).
    pub const fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Y => "y",
            TimeUnit::D => "d",
            TimeUnit::H => "h",
            TimeUnit::Min => "min",
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }

    pub(crate) const fn index(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_index(index: u8) -> Self {
        match index {
            0 => TimeUnit::Y,
            1 => TimeUnit::D,
            2 => TimeUnit::H,
            3 => TimeUnit::Min,
            4 => TimeUnit::S,
            5 => TimeUnit::Ms,
            6 => TimeUnit::Us,
            7 => TimeUnit::Ns,
            8 => TimeUnit::Ps,
            _ => TimeUnit::Fs,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" => Ok(TimeUnit::Y),
            "d" => Ok(TimeUnit::D),
            "h" => Ok(TimeUnit::H),
            "min" => Ok(TimeUnit::Min),
            "s" => Ok(TimeUnit::S),
            "ms" => Ok(TimeUnit::Ms),
            "us" | "µs" => Ok(TimeUnit::Us),
            "ns" => Ok(TimeUnit::Ns),
            "ps" => Ok(TimeUnit::Ps),
            "fs" => Ok(TimeUnit::Fs),
            _ => Err(TimeError::parse(s, "unknown time unit")),
        }
    }
}
