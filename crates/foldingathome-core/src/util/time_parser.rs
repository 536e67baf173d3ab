//! Duration and timestamp parsers for FAHClient replies.
//!
//! The command server reports time in three textual shapes:
//! - Compact durations from `$(uptime)`: `14h31m2s`
//! - RFC 3339 timestamps from `$(date)`: `2020-05-09T20:04:48Z`
//! - Spelled-out durations in `queue-info`: `2 hours 15 mins`, `6.98 days`

use std::time::Duration;

use chrono::DateTime;

/// Error type for time parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeParseError {
    pub input: String,
    pub message: String,
}

impl TimeParseError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse time '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for TimeParseError {}

/// Parses a compact duration such as `1h2m3s` or `1.5h`.
///
/// Only the `h`, `m` and `s` units are understood. A bare `0` is accepted.
/// Whitespace is not allowed; callers strip it first.
///
/// # Examples
///
/// ```
/// use foldingathome_core::util::parse_compact_duration;
///
/// let d = parse_compact_duration("1h2m3s").unwrap();
/// assert_eq!(d.as_secs(), 3723);
/// ```
pub fn parse_compact_duration(input: &str) -> Result<Duration, TimeParseError> {
    if input.is_empty() {
        return Err(TimeParseError::new(input, "empty duration"));
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0.0_f64;
    let mut rest = input;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number_str, tail) = rest.split_at(number_len);
        if number_str.is_empty() || number_str == "." {
            return Err(TimeParseError::new(input, "expected a number"));
        }
        let number: f64 = number_str
            .parse()
            .map_err(|_| TimeParseError::new(input, format!("invalid number '{number_str}'")))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let multiplier = match unit {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "" => return Err(TimeParseError::new(input, "missing unit")),
            other => {
                return Err(TimeParseError::new(
                    input,
                    format!("unknown unit '{other}' (expected h, m or s)"),
                ));
            }
        };

        total += number * multiplier;
        rest = tail;
    }

    Duration::try_from_secs_f64(total).map_err(|e| TimeParseError::new(input, e.to_string()))
}

/// Parses an RFC 3339 timestamp into Unix epoch seconds.
pub fn parse_timestamp(input: &str) -> Result<i64, TimeParseError> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.timestamp())
        .map_err(|e| TimeParseError::new(input, e.to_string()))
}

/// Parses a spelled-out FAHClient duration.
///
/// Format: one or more `<number> <unit>` pairs, e.g. `1 hours 30 mins` or
/// `0.00 secs`. Empty text and `unknowntime` are treated as zero.
pub fn parse_fah_duration(input: &str) -> Result<Duration, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "unknowntime" {
        return Ok(Duration::ZERO);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(TimeParseError::new(input, "expected '<number> <unit>' pairs"));
    }

    let mut total = 0.0_f64;
    for pair in tokens.chunks(2) {
        let number: f64 = pair[0]
            .parse()
            .map_err(|_| TimeParseError::new(input, format!("invalid number '{}'", pair[0])))?;

        let multiplier = match pair[1] {
            "day" | "days" => 86400.0,
            "hour" | "hours" => 3600.0,
            "min" | "mins" | "minute" | "minutes" => 60.0,
            "sec" | "secs" | "second" | "seconds" => 1.0,
            other => {
                return Err(TimeParseError::new(input, format!("unknown unit '{other}'")));
            }
        };

        total += number * multiplier;
    }

    Duration::try_from_secs_f64(total).map_err(|e| TimeParseError::new(input, e.to_string()))
}
