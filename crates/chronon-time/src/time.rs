//! The `VirtualTime` value type.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parse::literal_femtos;
use crate::{Resolution, TimeError, TimeUnit};

/// A point or span of virtual time, in ticks of the active [`Resolution`].
///
/// Ordering, equality and hashing work on the raw tick count. The `+`, `-`
/// and unary `-` operators panic on overflow; use [`checked_add`] and
/// [`checked_sub`] where overflow is an expected outcome.
///
/// [`checked_add`]: VirtualTime::checked_add
/// [`checked_sub`]: VirtualTime::checked_sub
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VirtualTime(i64);

impl VirtualTime {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i64::MAX);
    pub const MIN: Self = Self(i64::MIN);

    /// Wraps a raw tick count.
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Converts `value` expressed in `unit` into ticks.
    ///
    /// Fails with [`TimeError::OutOfRange`] when the result does not fit and
    /// with [`TimeError::PrecisionLoss`] when `value` is not a whole number of
    /// ticks (e.g. `1500ns` at microsecond resolution).
    pub fn from_unit(value: i64, unit: TimeUnit) -> Result<Self, TimeError> {
        let resolution = Resolution::get();
        let femtos = i128::from(value)
            .checked_mul(unit.femtos())
            .ok_or_else(|| TimeError::OutOfRange {
                value: value.to_string(),
                unit,
                resolution,
            })?;
        Self::from_femtos_exact(femtos, &value.to_string(), unit)
    }

    /// Like [`from_unit`](Self::from_unit) but truncates towards zero instead
    /// of reporting a sub-tick remainder.
    pub fn from_unit_truncating(value: i64, unit: TimeUnit) -> Result<Self, TimeError> {
        let resolution = Resolution::get();
        let out_of_range = || TimeError::OutOfRange {
            value: value.to_string(),
            unit,
            resolution,
        };
        let femtos = i128::from(value)
            .checked_mul(unit.femtos())
            .ok_or_else(out_of_range)?;
        let ticks = femtos / resolution.femtos();
        i64::try_from(ticks).map(Self).map_err(|_| out_of_range())
    }

    pub fn from_secs(secs: i64) -> Result<Self, TimeError> {
        Self::from_unit(secs, TimeUnit::S)
    }

    pub fn from_millis(millis: i64) -> Result<Self, TimeError> {
        Self::from_unit(millis, TimeUnit::Ms)
    }

    pub fn from_micros(micros: i64) -> Result<Self, TimeError> {
        Self::from_unit(micros, TimeUnit::Us)
    }

    pub fn from_nanos(nanos: i64) -> Result<Self, TimeError> {
        Self::from_unit(nanos, TimeUnit::Ns)
    }

    /// Converts fractional seconds, rounding to the nearest tick.
    pub fn from_secs_f64(secs: f64) -> Result<Self, TimeError> {
        let resolution = Resolution::get();
        let ticks_per_sec = TimeUnit::S.femtos() as f64 / resolution.femtos() as f64;
        let ticks = (secs * ticks_per_sec).round();
        if !ticks.is_finite() || ticks < i64::MIN as f64 || ticks >= i64::MAX as f64 {
            return Err(TimeError::OutOfRange {
                value: secs.to_string(),
                unit: TimeUnit::S,
                resolution,
            });
        }
        Ok(Self(ticks as i64))
    }

    /// Builds a time from a femtosecond count that must land on a tick.
    pub(crate) fn from_femtos_exact(
        femtos: i128,
        literal: &str,
        unit: TimeUnit,
    ) -> Result<Self, TimeError> {
        let resolution = Resolution::get();
        let per_tick = resolution.femtos();
        if femtos % per_tick != 0 {
            return Err(TimeError::PrecisionLoss {
                value: literal.to_string(),
                unit,
                resolution,
            });
        }
        i64::try_from(femtos / per_tick)
            .map(Self)
            .map_err(|_| TimeError::OutOfRange {
                value: literal.to_string(),
                unit,
                resolution,
            })
    }

    /// Expresses this time as a whole number of `unit`.
    ///
    /// Conversion to a coarser unit truncates towards zero. Conversion to a
    /// finer unit saturates at the `i64` bounds.
    pub fn as_unit(self, unit: TimeUnit) -> i64 {
        let scaled = scale(self.0, Resolution::get(), unit);
        i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
    }

    /// Nanosecond count with `i128` headroom (truncating below 1ns).
    pub fn as_nanos_i128(self) -> i128 {
        scale(self.0, Resolution::get(), TimeUnit::Ns)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 * Resolution::get().femtos() as f64 / TimeUnit::S.femtos() as f64
    }

    /// Wraps this time for display in a specific unit.
    pub fn with_unit(self, unit: TimeUnit) -> TimeWithUnit {
        TimeWithUnit { time: self, unit }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn abs(self) -> Self {
        match self.0.checked_abs() {
            Some(ticks) => Self(ticks),
            None => panic!("virtual time overflow: abs({self})"),
        }
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// True for zero and positive values.
    pub const fn is_positive(self) -> bool {
        self.0 >= 0
    }

    /// True for zero and negative values.
    pub const fn is_negative(self) -> bool {
        self.0 <= 0
    }

    pub const fn is_strictly_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_strictly_negative(self) -> bool {
        self.0 < 0
    }
}

/// Converts `ticks` of `from` into `to`, truncating towards zero and
/// saturating at the `i128` bounds.
fn scale(ticks: i64, from: TimeUnit, to: TimeUnit) -> i128 {
    let ticks = i128::from(ticks);
    if from.femtos() >= to.femtos() {
        ticks.saturating_mul(from.femtos() / to.femtos())
    } else {
        ticks / (to.femtos() / from.femtos())
    }
}

// ============================================================================
// Operators
// ============================================================================

impl Add for VirtualTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("virtual time overflow: {self} + {rhs}"),
        }
    }
}

impl Sub for VirtualTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match self.checked_sub(rhs) {
            Some(diff) => diff,
            None => panic!("virtual time overflow: {self} - {rhs}"),
        }
    }
}

impl AddAssign for VirtualTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for VirtualTime {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for VirtualTime {
    type Output = Self;

    fn neg(self) -> Self {
        match self.0.checked_neg() {
            Some(ticks) => Self(ticks),
            None => panic!("virtual time overflow: -({self})"),
        }
    }
}

// ============================================================================
// Formatting and parsing
// ============================================================================

/// Prints the signed tick count with the resolution suffix, e.g. `+5000000ns`.
impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}{}", self.0, Resolution::get().suffix())
    }
}

/// Parses `"<number><unit>"` such as `"100ms"`, `"1.5s"` or `"-3us"`.
///
/// A bare number is read as seconds. The result must be a whole number of
/// ticks at the active resolution.
impl FromStr for VirtualTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (femtos, unit) = literal_femtos(s)?;
        let number = s.trim().trim_end_matches(char::is_alphabetic).trim_end();
        Self::from_femtos_exact(femtos, number, unit)
    }
}

/// Display adapter returned by [`VirtualTime::with_unit`].
#[derive(Debug, Clone, Copy)]
pub struct TimeWithUnit {
    time: VirtualTime,
    unit: TimeUnit,
}

impl fmt::Display for TimeWithUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let femtos = i128::from(self.time.0) as f64 * Resolution::get().femtos() as f64;
        let value = femtos / self.unit.femtos() as f64;
        write!(f, "{value:+.3}{}", self.unit.suffix())
    }
}
