//! Time error types

use thiserror::Error;

use crate::TimeUnit;

/// Errors produced when constructing, converting or configuring virtual time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The value does not fit in 64 bits of ticks at the active resolution.
    #[error("{value}{unit} overflows virtual time at {resolution} resolution")]
    OutOfRange {
        value: String,
        unit: TimeUnit,
        resolution: TimeUnit,
    },

    /// The value is not a whole number of ticks at the active resolution.
    #[error("{value}{unit} is not a whole number of {resolution} ticks")]
    PrecisionLoss {
        value: String,
        unit: TimeUnit,
        resolution: TimeUnit,
    },

    /// The resolution was changed after the first event was scheduled.
    #[error(
        "time resolution is frozen at {current} once events have been scheduled; cannot switch to {requested}"
    )]
    ResolutionFrozen {
        current: TimeUnit,
        requested: TimeUnit,
    },

    /// Malformed time literal or unit name.
    #[error("invalid time literal '{input}': {reason}")]
    Parse { input: String, reason: &'static str },
}

impl TimeError {
    pub(crate) fn parse(input: &str, reason: &'static str) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason,
        }
    }
}
