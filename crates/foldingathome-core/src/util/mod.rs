//! Utility modules for the exporter.

mod time_parser;

pub use time_parser::{TimeParseError, parse_compact_duration, parse_fah_duration, parse_timestamp};
