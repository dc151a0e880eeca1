//! `$date` helpers

use chrono::{NaiveDateTime, TimeZone, Utc};
use dumpscope_format::{DateTime, DumpError, Result};

/// Split epoch milliseconds into (seconds, nanoseconds).
///
/// Uses truncating division, so for negative input both parts carry the
/// sign: `-1500` gives `(-1, -500_000_000)`, not `(-2, 500_000_000)`.
pub fn split_epoch_millis(millis: i64) -> (i64, i64) {
    (millis / 1_000, (millis % 1_000) * 1_000_000)
}

/// Converts the string form of a `$date` payload
pub trait DateParser: Send + Sync {
    /// Parse `s` into a datetime
    fn parse_date(&self, s: &str) -> Result<DateTime>;
}

/// Accepts the ISO-8601 layouts legacy tools emit.
///
/// Offsets may be `Z`, `+hh:mm` or `+hhmm`; seconds and fractional seconds
/// are optional in the compact-offset forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDateParser;

const OFFSET_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const UTC_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

impl DateParser for LegacyDateParser {
    fn parse_date(&self, s: &str) -> Result<DateTime> {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return Ok(DateTime::from_millis(dt.timestamp_millis()));
        }
        for layout in OFFSET_LAYOUTS {
            if let Ok(dt) = chrono::DateTime::parse_from_str(s, layout) {
                return Ok(DateTime::from_millis(dt.timestamp_millis()));
            }
        }
        if let Some(naive) = s.strip_suffix('Z') {
            for layout in UTC_LAYOUTS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(naive, layout) {
                    return Ok(DateTime::from_millis(Utc.from_utc_datetime(&dt).timestamp_millis()));
                }
            }
        }
        Err(DumpError::Encoding {
            key: "$date",
            reason: format!("unrecognized date string {s:?}"),
        })
    }
}
