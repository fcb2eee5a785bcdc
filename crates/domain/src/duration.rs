//! Time durations used by timer conditions.
//!
//! Two notations are accepted, plus the infinity markers `*` / `+*` / `-*`:
//!
//! - the compact form `[+-]<n><unit>[ <n><unit>]…` with units `y`, `mn`
//!   (30-day month), `w`, `d`, `h`, `m`, `s`, `ms`, case-insensitive,
//!   e.g. `1h 30m` or `-2d`;
//! - ISO-8601 `P[nY][nM][nW][nD][T[nH][nM][nS]]`, e.g. `PT90M`.

use chrono::TimeDelta;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
const MILLIS_PER_WEEK: i64 = 7 * MILLIS_PER_DAY;
const MILLIS_PER_MONTH: i64 = 30 * MILLIS_PER_DAY;
const MILLIS_PER_YEAR: i64 = 365 * MILLIS_PER_DAY;

/// A parsed time duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDuration {
    PositiveInfinity,
    NegativeInfinity,
    Finite(TimeDelta),
}

impl TimeDuration {
    /// Length in milliseconds, `None` for the infinities.
    #[must_use]
    pub fn as_millis(self) -> Option<i64> {
        match self {
            Self::Finite(delta) => Some(delta.num_milliseconds()),
            Self::PositiveInfinity | Self::NegativeInfinity => None,
        }
    }
}

/// Why a duration string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,

    #[error("malformed duration {input:?}")]
    Malformed { input: String },

    #[error("unknown duration unit {unit:?}")]
    UnknownUnit { unit: String },

    #[error("duration out of range")]
    Overflow,
}

/// `true` when `input` parses as a [`TimeDuration`].
#[must_use]
pub fn is_time_duration(input: &str) -> bool {
    parse_time_duration(input).is_ok()
}

/// Parse a duration in compact or ISO-8601 notation.
///
/// # Errors
///
/// Returns [`DurationError`] when the input is blank, malformed, uses an
/// unknown unit, or does not fit in a millisecond count.
pub fn parse_time_duration(input: &str) -> Result<TimeDuration, DurationError> {
    let trimmed = input.trim();
    match trimmed {
        "" => return Err(DurationError::Empty),
        "*" | "+*" => return Ok(TimeDuration::PositiveInfinity),
        "-*" => return Ok(TimeDuration::NegativeInfinity),
        _ => {}
    }

    let (negative, body) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let millis = match body.strip_prefix(['P', 'p']) {
        Some(iso) => parse_iso(iso).ok_or_else(|| malformed(input))??,
        None => parse_compact(body).ok_or_else(|| malformed(input))??,
    };
    let millis = if negative { -millis } else { millis };

    TimeDelta::try_milliseconds(millis)
        .map(TimeDuration::Finite)
        .ok_or(DurationError::Overflow)
}

fn malformed(input: &str) -> DurationError {
    DurationError::Malformed {
        input: input.to_string(),
    }
}

/// Splits `<digits><letters>` terms off the front of a string.
struct Terms<'a> {
    rest: &'a str,
}

impl<'a> Terms<'a> {
    /// Next `(amount, unit)` pair; `Some(None)` on a malformed term.
    fn next_term(&mut self, skip_whitespace: bool) -> Option<Option<(i64, &'a str)>> {
        if skip_whitespace {
            self.rest = self.rest.trim_start();
        }
        if self.rest.is_empty() {
            return None;
        }
        let digits_end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let unit_end = self.rest[digits_end..]
            .find(|c: char| !c.is_ascii_alphabetic())
            .map_or(self.rest.len(), |offset| digits_end + offset);
        if digits_end == 0 || unit_end == digits_end {
            return Some(None);
        }
        let amount = self.rest[..digits_end].parse().ok();
        let unit = &self.rest[digits_end..unit_end];
        self.rest = &self.rest[unit_end..];
        Some(amount.map(|amount| (amount, unit)))
    }
}

fn accumulate(total: i64, amount: i64, unit_millis: i64) -> Result<i64, DurationError> {
    amount
        .checked_mul(unit_millis)
        .and_then(|millis| total.checked_add(millis))
        .ok_or(DurationError::Overflow)
}

/// Outer `None` means malformed; inner error is a unit or range problem.
fn parse_compact(body: &str) -> Option<Result<i64, DurationError>> {
    let mut terms = Terms { rest: body };
    let mut total = 0_i64;
    let mut seen = false;
    while let Some(term) = terms.next_term(true) {
        let (amount, unit) = term?;
        let unit_millis = match unit.to_ascii_lowercase().as_str() {
            "y" => MILLIS_PER_YEAR,
            "mn" => MILLIS_PER_MONTH,
            "w" => MILLIS_PER_WEEK,
            "d" => MILLIS_PER_DAY,
            "h" => MILLIS_PER_HOUR,
            "m" => MILLIS_PER_MINUTE,
            "s" => MILLIS_PER_SECOND,
            "ms" => 1,
            _ => {
                return Some(Err(DurationError::UnknownUnit {
                    unit: unit.to_string(),
                }));
            }
        };
        total = match accumulate(total, amount, unit_millis) {
            Ok(total) => total,
            Err(err) => return Some(Err(err)),
        };
        seen = true;
    }
    seen.then_some(Ok(total))
}

/// Parses the part after the leading `P`.
fn parse_iso(body: &str) -> Option<Result<i64, DurationError>> {
    let (date, time) = match body.find(['T', 't']) {
        Some(index) => (&body[..index], Some(&body[index + 1..])),
        None => (body, None),
    };
    if time.is_some_and(str::is_empty) {
        return None;
    }

    let mut total = 0_i64;
    let mut seen = false;
    for (part, is_time) in [(date, false), (time.unwrap_or_default(), true)] {
        let mut terms = Terms { rest: part };
        while let Some(term) = terms.next_term(false) {
            let (amount, unit) = term?;
            let unit_millis = match (unit.to_ascii_uppercase().as_str(), is_time) {
                ("Y", false) => MILLIS_PER_YEAR,
                ("M", false) => MILLIS_PER_MONTH,
                ("W", false) => MILLIS_PER_WEEK,
                ("D", false) => MILLIS_PER_DAY,
                ("H", true) => MILLIS_PER_HOUR,
                ("M", true) => MILLIS_PER_MINUTE,
                ("S", true) => MILLIS_PER_SECOND,
                _ => return None,
            };
            total = match accumulate(total, amount, unit_millis) {
                Ok(total) => total,
                Err(err) => return Some(Err(err)),
            };
            seen = true;
        }
    }
    seen.then_some(Ok(total))
}
