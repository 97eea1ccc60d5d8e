use std::convert::TryFrom;
use std::time::Duration;

use nom::{branch::alt, bytes::complete::tag, character::complete::digit1};

use super::result::{IResult, ParseError, Span};
use crate::error::{Error, Result};

/// Parses a whole string as a duration literal. Trailing input is an error,
/// so Flux-only units like `1mo` or `10us` are rejected.
pub fn parse_duration(s: &str) -> Result<Duration> {
    match duration(Span::new(s)) {
        Ok((rest, d)) if rest.fragment().is_empty() => Ok(d),
        Ok((rest, _)) => Err(Error::format(format!(
            "unexpected '{}' in duration '{}'",
            rest.fragment(),
            s
        ))),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into()),
        Err(nom::Err::Incomplete(_)) => Err(Error::format(format!("incomplete duration '{}'", s))),
    }
}

/// Renders a duration with the largest units first, e.g. `90m` becomes `1h30m`.
pub fn format_duration(d: Duration) -> String {
    let mut rest = d.as_millis();
    if rest == 0 {
        return "0s".to_owned();
    }

    let mut out = String::new();
    let mut unit = Some(Unit::Year);
    while let Some(u) = unit {
        let ms = u.milliseconds() as u128;
        if rest >= ms {
            out.push_str(&format!("{}{}", rest / ms, u.symbol()));
            rest %= ms;
        }
        unit = u.descendant();
    }
    out
}

/// Parse Go-like duration string: `2s`, `1y3w5d7h9m`.
/// - Only positive durations.
/// - No fractional units.
/// - Units are always ordered from longest to shortest.
pub(super) fn duration(input: Span) -> IResult<Duration> {
    let (rest, duration) = duration_inner(input, Unit::Year)?;

    if duration.eq(&Duration::from_millis(0)) {
        return Err(nom::Err::Failure(ParseError::new(
            "duration must be greater than 0".to_owned(),
            input,
        )));
    }

    Ok((rest, duration))
}

#[derive(Copy, Clone)]
enum Unit {
    Millisecond,
    Second, // 1000 milliseconds
    Minute, // 60 seconds
    Hour,   // 60 minutes
    Day,    // 24 hours
    Week,   // 7 days
    Year,   // 365 days, always
}

impl Unit {
    fn milliseconds(&self) -> u64 {
        use Unit::*;
        match self {
            Millisecond => 1,
            Second => 1000,
            Minute => 60 * 1000,
            Hour => 60 * 60 * 1000,
            Day => 24 * 60 * 60 * 1000,
            Week => 7 * 24 * 60 * 60 * 1000,
            Year => 365 * 24 * 60 * 60 * 1000,
        }
    }

    fn symbol(&self) -> &'static str {
        use Unit::*;
        match self {
            Millisecond => "ms",
            Second => "s",
            Minute => "m",
            Hour => "h",
            Day => "d",
            Week => "w",
            Year => "y",
        }
    }

    fn descendant(&self) -> Option<Self> {
        use Unit::*;
        match self {
            Millisecond => None,
            Second => Some(Millisecond),
            Minute => Some(Second),
            Hour => Some(Minute),
            Day => Some(Hour),
            Week => Some(Day),
            Year => Some(Week),
        }
    }
}

impl TryFrom<&str> for Unit {
    type Error = Error;

    fn try_from(u: &str) -> Result<Self> {
        use Unit::*;

        match u {
            "y" => Ok(Year),
            "w" => Ok(Week),
            "d" => Ok(Day),
            "h" => Ok(Hour),
            "m" => Ok(Minute),
            "s" => Ok(Second),
            "ms" => Ok(Millisecond),
            _ => Err(Error::format("unknown duration unit")),
        }
    }
}

fn duration_inner(input: Span, max_allowed_unit: Unit) -> IResult<Duration> {
    let (rest, multiplier) = digit1(input)?;

    let (rest, unit) = alt((
        tag("ms"),
        tag("s"),
        tag("m"),
        tag("h"),
        tag("d"),
        tag("w"),
        tag("y"),
    ))(rest)?;

    let failure = |message: &str| nom::Err::Failure(ParseError::new(message.to_owned(), input));

    let unit = Unit::try_from(*unit.fragment()).map_err(|_| failure("unknown duration unit"))?;
    if unit.milliseconds() > max_allowed_unit.milliseconds() {
        return Err(failure("invalid duration literal"));
    }

    let multiplier = multiplier
        .fragment()
        .parse::<u32>()
        .map_err(|_| failure("duration multiplier is too large"))?;
    let duration = Duration::from_millis(unit.milliseconds())
        .checked_mul(multiplier)
        .ok_or_else(|| failure("duration overflow occurred"))?;

    if let Some(next_unit) = unit.descendant() {
        let (rest, more_duration) = match duration_inner(rest, next_unit) {
            Ok((rest, more_duration)) => (rest, more_duration),
            Err(nom::Err::Error(_)) => (rest, Duration::from_millis(0)),
            Err(e) => return Err(e),
        };
        let total = duration
            .checked_add(more_duration)
            .ok_or_else(|| failure("duration overflow occurred"))?;
        Ok((rest, total))
    } else {
        Ok((rest, duration))
    }
}
