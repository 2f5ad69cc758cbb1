//! Looks up the current UTC offset of a timezone for displaying message times.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset of `canonical_timezone`, e.g. "Asia/Ho_Chi_Minh".
///
/// Returns `None` if the timezone is not known.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod get_local_offset_tests {
    use time::macros::offset;

    use super::get_local_offset;

    #[test]
    fn timezone_without_daylight_saving() {
        assert_eq!(get_local_offset("Asia/Ho_Chi_Minh"), Some(offset!(+7)));
    }

    #[test]
    fn utc() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(offset!(UTC)));
    }

    #[test]
    fn unknown_timezone() {
        assert_eq!(get_local_offset("Not/A_Timezone"), None);
    }
}
