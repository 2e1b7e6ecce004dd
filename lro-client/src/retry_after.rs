//! Retry-After handling
//!
//! Resource Manager advertises the next poll time through `retry-after-ms`,
//! `x-ms-retry-after-ms` (milliseconds) or the standard `Retry-After` header
//! (delay in seconds or an HTTP-date).

use chrono::{DateTime, Utc};
use lro_core::ResponseSnapshot;
use std::time::Duration;

const MILLISECOND_HEADERS: [&str; 2] = ["retry-after-ms", "x-ms-retry-after-ms"];

/// Reads the delay a response asks for before the next request
///
/// HTTP-dates in the past yield a zero delay. Returns `None` when no header is
/// present or none of them parse.
pub fn retry_after(response: &ResponseSnapshot, now: DateTime<Utc>) -> Option<Duration> {
    for name in MILLISECOND_HEADERS {
        if let Some(millis) = response
            .header(name)
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            return Some(Duration::from_millis(millis));
        }
    }

    let value = response.header("retry-after")?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    Some(
        (at.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

/// The advertised delay, or `default` when the response does not specify one
pub(crate) fn poll_interval(response: &ResponseSnapshot, default: Duration) -> Duration {
    retry_after(response, Utc::now()).unwrap_or(default)
}
