//! Time-interval string parsing
//!
//! Interval specs are a number followed by an optional unit (`us`, `ms`,
//! `s`, `m`, case-insensitive); a bare number means seconds. Results are
//! truncated integer microseconds. Interval/offset pairs are written as
//! `"<interval>:<offset>"` and the halves parse independently.

use thiserror::Error;

/// Errors raised while parsing a time-interval string
#[derive(Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("'{0}' is not a valid time-interval string (examples: '1.5s', '250ms', '2us', '3m')")]
    Unparsable(String),

    #[error("Interval must be non-negative, got '{0}'")]
    Negative(String),
}

const US_PER_US: f64 = 1.0;
const US_PER_MS: f64 = 1_000.0;
const US_PER_S: f64 = 1_000_000.0;
const US_PER_M: f64 = 60_000_000.0;

/// Parse an interval spec into truncated integer microseconds.
///
/// Units are matched longest-first: `us` before `ms` before `s` before `m`,
/// so that the trailing `s` of `ms` is never misread as seconds.
pub fn parse_interval(spec: &str) -> Result<u64, IntervalError> {
    let lowered = spec.trim().to_lowercase();

    let (number, factor) = if let Some(n) = lowered.strip_suffix("us") {
        (n, US_PER_US)
    } else if let Some(n) = lowered.strip_suffix("ms") {
        (n, US_PER_MS)
    } else if let Some(n) = lowered.strip_suffix('s') {
        (n, US_PER_S)
    } else if let Some(n) = lowered.strip_suffix('m') {
        (n, US_PER_M)
    } else {
        (lowered.as_str(), US_PER_S)
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| IntervalError::Unparsable(spec.to_string()))?;
    if value < 0.0 {
        return Err(IntervalError::Negative(spec.to_string()));
    }

    // Truncate, never round.
    Ok((value * factor) as u64)
}

/// Parse an `"<interval>[:<offset>]"` pair.
///
/// The offset half is optional; both halves go through [`parse_interval`].
pub fn parse_interval_pair(spec: &str) -> Result<(u64, Option<u64>), IntervalError> {
    match spec.split_once(':') {
        None => Ok((parse_interval(spec)?, None)),
        Some((interval, offset)) => {
            Ok((parse_interval(interval)?, Some(parse_interval(offset)?)))
        }
    }
}

/// Clamp an offset to half the interval; a missing offset becomes 0.
///
/// An offset larger than half the polling interval would push a sample past
/// the midpoint of the next window, so the daemons treat interval/2 as the
/// usable maximum.
pub fn clamp_offset(interval_us: u64, offset_us: Option<u64>) -> u64 {
    match offset_us {
        None => 0,
        Some(offset) => {
            if interval_us > 0 && offset as f64 / interval_us as f64 > 0.5 {
                interval_us / 2
            } else {
                offset
            }
        }
    }
}
