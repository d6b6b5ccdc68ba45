//! HTTP date handling
//!
//! Formats and parses the HTTP-date values used by `Last-Modified`,
//! `Expires` and `If-Modified-Since`.

use chrono::{DateTime, Utc};
use std::time::UNIX_EPOCH;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format epoch seconds as an IMF-fixdate, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`
pub fn format_http_date(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_default()
        .format(IMF_FIXDATE)
        .to_string()
}

/// Parse an HTTP-date header value into epoch seconds
///
/// Parameters after `;` are dropped first; some proxies append
/// `; length=1234` to `If-Modified-Since`. Accepts the three HTTP-date forms
/// and falls back to RFC 2822 dates with numeric offsets. Anything else
/// yields `None`.
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.split(';').next()?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(time) = httpdate::parse_http_date(value) {
        return time
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|d| i64::try_from(d.as_secs()).ok());
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Current time in epoch seconds
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// `Expires` value for a response cached for `max_age` seconds from now
pub fn expires_after(max_age: u32) -> String {
    format_http_date(now() + i64::from(max_age))
}
