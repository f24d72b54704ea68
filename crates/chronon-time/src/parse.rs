//! Time literal parsing (`"100ms"`, `"1.5s"`, `"250"`).

use std::time::Duration;

use crate::{Resolution, TimeError, TimeUnit};

/// Longest fractional part accepted; beyond femtoseconds nothing survives.
const MAX_FRACTION_DIGITS: usize = 30;

/// Parses a literal into an exact femtosecond count and the unit it used.
pub(crate) fn literal_femtos(input: &str) -> Result<(i128, TimeUnit), TimeError> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| c.is_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);
    let number = number.trim_end();

    let unit = if suffix.is_empty() {
        TimeUnit::S
    } else {
        suffix
            .parse::<TimeUnit>()
            .map_err(|_| TimeError::parse(input, "unknown time unit"))?
    };

    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(TimeError::parse(input, "missing number"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(TimeError::parse(input, "expected a decimal number"));
    }
    if fraction.len() > MAX_FRACTION_DIGITS {
        return Err(TimeError::parse(input, "too many fractional digits"));
    }

    let out_of_range = || TimeError::OutOfRange {
        value: number.to_string(),
        unit,
        resolution: Resolution::get(),
    };

    let whole: i128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| out_of_range())?
    };
    let mut femtos = whole.checked_mul(unit.femtos()).ok_or_else(out_of_range)?;

    if !fraction.is_empty() {
        let numerator: i128 = fraction.parse().map_err(|_| out_of_range())?;
        let denominator = 10_i128.pow(fraction.len() as u32);
        let scaled = numerator
            .checked_mul(unit.femtos())
            .ok_or_else(out_of_range)?;
        if scaled % denominator != 0 {
            return Err(TimeError::PrecisionLoss {
                value: number.to_string(),
                unit,
                resolution: TimeUnit::Fs,
            });
        }
        femtos = femtos
            .checked_add(scaled / denominator)
            .ok_or_else(out_of_range)?;
    }

    Ok((if negative { -femtos } else { femtos }, unit))
}

/// Parses a literal into a wall-clock [`Duration`] (nanosecond precision).
///
/// Used for settings that describe real time, such as the realtime jitter
/// limit. Negative values are rejected; sub-nanosecond parts are truncated.
pub fn parse_duration(input: &str) -> Result<Duration, TimeError> {
    let (femtos, unit) = literal_femtos(input)?;
    if femtos < 0 {
        return Err(TimeError::parse(input, "duration must not be negative"));
    }
    let nanos = u64::try_from(femtos / TimeUnit::Ns.femtos()).map_err(|_| {
        TimeError::OutOfRange {
            value: input.trim().to_string(),
            unit,
            resolution: TimeUnit::Ns,
        }
    })?;
    Ok(Duration::from_nanos(nanos))
}
