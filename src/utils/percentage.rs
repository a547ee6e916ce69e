use std::{fmt::Display, ops::Deref};

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Percentage as a fraction, 50% being 0.5.
    pub fn fraction(&self) -> f64 {
        self.0 / 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `value`, capped at 100%. An empty whole counts as complete.
pub fn capped_duration_percentage(value: Duration, whole: Duration) -> Percentage {
    if whole <= Duration::zero() {
        return Percentage(100.);
    }
    let ratio = value.num_milliseconds().max(0) as f64 / whole.num_milliseconds() as f64;
    Percentage((ratio * 100.).min(100.))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::capped_duration_percentage;

    #[test]
    fn caps_at_hundred() {
        let p = capped_duration_percentage(Duration::hours(9), Duration::hours(8));
        assert_eq!(*p, 100.);
        assert_eq!(p.fraction(), 1.);
    }
}
