//! Display formatting for the raw timestamps carried by [`FeedItem`](crate::feed::FeedItem).
//!
//! The normalizers keep `pubDate`/`published`/`updated` verbatim; this module
//! is the later formatting layer. Atom uses RFC 3339 and RSS uses RFC 2822,
//! so those are the two formats tried.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

/// Format used for rendered date-times.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used by [`to_local_date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Renders a raw feed timestamp in the local time zone.
///
/// Returns `None` for empty or unparseable input.
pub fn format_timestamp(raw: &str) -> Option<String> {
    format_timestamp_in(raw, &Local)
}

/// Renders a raw feed timestamp in the given time zone.
pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let parsed = parse_timestamp(raw)?;
    Some(parsed.with_timezone(tz).format(DISPLAY_FORMAT).to_string())
}

/// Parses an RFC 3339 or RFC 2822 timestamp, keeping its offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw)) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(timestamp = %raw, error = %e, "Unable to format timestamp");
            None
        }
    }
}

/// Renders seconds since the Unix epoch as a local calendar date.
pub fn to_local_date(epoch_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .map(|utc| utc.with_timezone(&Local).format(DATE_FORMAT).to_string())
}
