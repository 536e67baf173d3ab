//! Parsers turning raw FAHClient replies into metric records.
//!
//! `eval` output keeps a trailing `\` from the command server's line
//! continuation; `strip_continuation` removes it before any parsing happens.

use tracing::trace;

use crate::client::{InfoSection, SlotInfo};
use crate::metrics::{MetricDescriptors, MetricSink};
use crate::util::{TimeParseError, parse_compact_duration, parse_timestamp};

use super::status::SlotStatus;

/// Info section holding the client's own attributes.
const CLIENT_SECTION: &str = "FAHClient";
const VERSION_KEY: &str = "Version";

/// Error type for reply parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Uptime(TimeParseError),
    Date(TimeParseError),
    /// No `Version` entry in a `FAHClient` section.
    VersionNotFound,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Uptime(e) => write!(f, "uptime: {}", e),
            ParseError::Date(e) => write!(f, "date: {}", e),
            ParseError::VersionNotFound => write!(f, "Version not found in info response"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Removes one trailing `\` left by the command server.
pub fn strip_continuation(raw: &str) -> &str {
    let raw = raw.trim_end();
    raw.strip_suffix('\\').unwrap_or(raw)
}

/// Parses `$(uptime)` output such as `14h 31m  2s\`.
pub fn parse_uptime(
    descriptors: &MetricDescriptors,
    sink: &mut dyn MetricSink,
    raw: &str,
) -> Result<(), ParseError> {
    let compact: String = strip_continuation(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let uptime = parse_compact_duration(&compact).map_err(ParseError::Uptime)?;

    sink.emit(descriptors.uptime.record(uptime.as_secs_f64(), &[]));
    Ok(())
}

/// Parses `$(date)` output such as `2020-05-09T20:04:48Z\`.
pub fn parse_date(
    descriptors: &MetricDescriptors,
    sink: &mut dyn MetricSink,
    raw: &str,
) -> Result<(), ParseError> {
    let timestamp = parse_timestamp(strip_continuation(raw).trim()).map_err(ParseError::Date)?;

    sink.emit(descriptors.time.record(timestamp as f64, &[]));
    Ok(())
}

/// Emits the client version found in the `FAHClient` info section.
pub fn parse_info(
    descriptors: &MetricDescriptors,
    sink: &mut dyn MetricSink,
    info: &[InfoSection],
) -> Result<(), ParseError> {
    let version = info
        .iter()
        .filter(|section| section.name == CLIENT_SECTION)
        .find_map(|section| section.get(VERSION_KEY))
        .ok_or(ParseError::VersionNotFound)?;

    sink.emit(descriptors.version.record(1.0, &[version]));
    Ok(())
}

/// Emits one status gauge per slot. Unrecognized statuses report 0.
pub fn parse_slot_info(
    descriptors: &MetricDescriptors,
    sink: &mut dyn MetricSink,
    slots: &[SlotInfo],
) {
    for slot in slots {
        let status = SlotStatus::parse(&slot.status);
        if status == SlotStatus::Unknown {
            trace!(id = %slot.id, status = %slot.status, "unrecognized slot status");
        }
        sink.emit(
            descriptors
                .slot_status
                .record(status.ordinal(), &[slot.id.as_str(), slot.description.as_str()]),
        );
    }
}
