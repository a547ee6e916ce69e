use std::{fmt::Display, str::FromStr};

pub const MAX_HOURS: u8 = 23;
pub const MAX_MINUTES: u8 = 59;
pub const MAX_SECONDS: u8 = 59;

/// Hours, minutes and seconds typed by the user into the timer. Values are always within their
/// bounds, anything else gets clamped on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeParts {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TimeParts {
    pub fn clamped(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            hours: clamp_part(hours, MAX_HOURS),
            minutes: clamp_part(minutes, MAX_MINUTES),
            seconds: clamp_part(seconds, MAX_SECONDS),
        }
    }

    /// Builds parts from three free-form text fields. Garbage reads as zero.
    pub fn from_fields(hours: &str, minutes: &str, seconds: &str) -> Self {
        Self::clamped(
            lenient_int(hours),
            lenient_int(minutes),
            lenient_int(seconds),
        )
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn total_ms(&self) -> u64 {
        (self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64) * 1000
    }
}

impl Display for TimeParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Accepts `HH:MM:SS`, `HH:MM` or `HH`. Never fails: bad fields become zero and large ones are
/// clamped.
impl FromStr for TimeParts {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.trim().splitn(3, ':');
        let hours = fields.next().unwrap_or_default();
        let minutes = fields.next().unwrap_or_default();
        let seconds = fields.next().unwrap_or_default();
        Ok(Self::from_fields(hours, minutes, seconds))
    }
}

fn clamp_part(value: i64, max: u8) -> u8 {
    value.clamp(0, max as i64) as u8
}

/// Reads the leading integer of `text` the way a number input would: an optional sign followed
/// by digits, anything after is ignored. No digits means zero.
pub fn lenient_int(text: &str) -> i64 {
    let text = text.trim();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::{lenient_int, TimeParts};

    #[test]
    fn out_of_range_parts_are_clamped() {
        let parts = TimeParts::clamped(30, -4, 75);
        assert_eq!((parts.hours(), parts.minutes(), parts.seconds()), (23, 0, 59));
    }

    #[test]
    fn garbage_fields_read_as_zero() {
        let parts = TimeParts::from_fields("abc", "12px", "");
        assert_eq!(parts, TimeParts::clamped(0, 12, 0));
    }

    #[test]
    fn parses_clock_text() {
        let parts: TimeParts = "01:30:00".parse().unwrap();
        assert_eq!(parts.total_ms(), 5_400_000);
        assert_eq!(parts.to_string(), "01:30:00");

        let short: TimeParts = "2:5".parse().unwrap();
        assert_eq!(short.to_string(), "02:05:00");
    }

    #[test]
    fn lenient_int_behaves_like_number_inputs() {
        assert_eq!(lenient_int(" 42 "), 42);
        assert_eq!(lenient_int("-7"), -7);
        assert_eq!(lenient_int("9abc"), 9);
        assert_eq!(lenient_int("x9"), 0);
        assert_eq!(lenient_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn every_in_range_value_round_trips_to_milliseconds() {
        for h in [0, 1, 12, 23] {
            for m in [0, 29, 59] {
                for s in [0, 1, 59] {
                    let parts = TimeParts::clamped(h, m, s);
                    assert_eq!(parts.total_ms(), ((h * 3600 + m * 60 + s) * 1000) as u64);
                }
            }
        }
    }
}
