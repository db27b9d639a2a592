//! Time related utils.

use crate::Error;
use chrono::{SubsecRound, Utc};

/// DateTime is the alias for `chrono::DateTime<chrono::Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now, truncated to whole seconds.
///
/// Shared access signatures and delegation keys carry second precision only.
pub fn now() -> DateTime {
    Utc::now().trunc_subsecs(0)
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into ISO 8601 with second precision: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse time from RFC3339.
///
/// All of the following are valid:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-01T08:12:34+00:00`
/// - `2022-03-01T08:12:34.0000000Z`
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("parse '{s}' into rfc3339 failed")).with_source(e))?
        .with_timezone(&Utc))
}

/// Parse a unix timestamp in seconds, given as a decimal string.
pub fn parse_timestamp(s: &str) -> crate::Result<DateTime> {
    let secs = s
        .trim()
        .parse::<i64>()
        .map_err(|e| Error::unexpected(format!("parse '{s}' into timestamp failed")).with_source(e))?;
    chrono::DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::unexpected(format!("timestamp '{s}' is out of range")))
}
