//! Resolving the configured canonical timezone to a UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Look up `canonical_timezone` (e.g. "Pacific/Auckland") and return its
/// current UTC offset, or `None` if the name is unknown.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)?;

    Some(timezone.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}
