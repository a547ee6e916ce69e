use chrono::{DateTime, NaiveDate, TimeZone};

/// This is the standard way of converting a date to a string in worktimer. It mirrors the
/// browser's `Date.toDateString()`, e.g. `Fri Oct 16 2026`, so existing day keys stay readable.
pub fn date_to_day_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Hour and minute of a moment as `HH:MM`.
pub fn clock_caption<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    moment.format("%H:%M").to_string()
}

/// Splits milliseconds into whole hours, minutes and seconds. Hours are not wrapped at 24.
pub fn split_hms(ms: u64) -> (u64, u64, u64) {
    let total_seconds = ms / 1000;
    (total_seconds / 3600, (total_seconds % 3600) / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{clock_caption, date_to_day_key, split_hms};

    #[test]
    fn day_key_matches_browser_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 6).unwrap();
        assert_eq!(date_to_day_key(date), "Tue Oct 06 2026");
    }

    #[test]
    fn caption_is_zero_padded() {
        let moment = Utc.with_ymd_and_hms(2026, 1, 2, 7, 5, 59).unwrap();
        assert_eq!(clock_caption(&moment), "07:05");
    }

    #[test]
    fn hms_does_not_wrap_hours() {
        assert_eq!(split_hms(25 * 3_600_000 + 61_999), (25, 1, 1));
    }
}
