use std::convert::TryFrom;

use chrono::prelude::*;

use super::record::Scalar;
use crate::error::{Error, ErrorKind, Result};

// Unix timestamp in milliseconds.
pub type Timestamp = i64;

/// Numeric epochs whose magnitude is below this are taken as seconds,
/// anything at or above it as milliseconds.
pub const SECONDS_THRESHOLD: f64 = 1e12;

pub fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}

pub fn normalize_epoch(n: f64) -> Timestamp {
    if n.abs() < SECONDS_THRESHOLD {
        (n * 1000.0).round() as Timestamp
    } else {
        n.round() as Timestamp
    }
}

/// Integer epochs are scaled without going through `f64`.
fn normalize_integer_epoch(n: i64) -> Timestamp {
    if (n as f64).abs() < SECONDS_THRESHOLD {
        n * 1000
    } else {
        n
    }
}

pub fn normalize_timestamp(raw: &Scalar) -> Result<Timestamp> {
    match raw {
        Scalar::Integer(n) => Ok(normalize_integer_epoch(*n)),
        Scalar::Unsigned(n) => match i64::try_from(*n) {
            Ok(n) => Ok(normalize_integer_epoch(n)),
            Err(e) => Err((
                ErrorKind::Format,
                format!("timestamp {} is out of range", n),
                e,
            )
                .into()),
        },
        Scalar::Number(n) if n.is_finite() => Ok(normalize_epoch(*n)),
        Scalar::String(s) => parse_timestamp(s),
        other => Err(Error::format(format!(
            "unsupported timestamp value {:?}",
            other
        ))),
    }
}

/// Parses an RFC3339 string (any offset, optional fraction) or a numeric epoch.
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }

    // ISO-like without an offset, taken as UTC.
    for format in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&dt).timestamp_millis());
        }
    }

    if let Ok(n) = s.parse::<i64>() {
        return Ok(normalize_integer_epoch(n));
    }

    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(normalize_epoch(n)),
        Ok(_) => Err(Error::format(format!("timestamp '{}' is not finite", s))),
        Err(e) => Err((
            ErrorKind::Format,
            format!("couldn't parse timestamp '{}'", s),
            e,
        )
            .into()),
    }
}
