use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::utils::percentage::{capped_duration_percentage, Percentage};

use super::{parts::TimeParts, snapshot::SessionSnapshot};

/// Stopped is the state before the first start and after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

/// Visual intensity of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityBand {
    Low,
    Medium,
    High,
}

impl IntensityBand {
    pub fn for_progress(progress: Percentage) -> Self {
        if *progress < 50. {
            Self::Low
        } else if *progress < 80. {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// What the clock shows at a given moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub elapsed_ms: u64,
    pub progress: Percentage,
    pub band: IntensityBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// This tick landed on an autosave second.
    pub persist: bool,
}

/// State machine of a single work session. It never reads the time by itself: every operation
/// receives the current moment, so it can be driven by any host and tested with fixed instants.
///
/// While running, elapsed time is always `now - start_instant`; `elapsed_ms` is only a cache.
/// While stopped or paused `elapsed_ms` is authoritative.
#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    start_instant: Option<DateTime<Utc>>,
    elapsed_ms: u64,
    initial_ms: u64,
    /// Whether the host is currently delivering ticks for this run.
    ticking: bool,
    max_session: Duration,
    autosave_every_secs: u64,
}

impl SessionClock {
    pub fn new(max_session: Duration, autosave_every_secs: u64) -> Self {
        Self {
            state: ClockState::Stopped,
            start_instant: None,
            elapsed_ms: 0,
            initial_ms: 0,
            ticking: false,
            max_session,
            autosave_every_secs: autosave_every_secs.max(1),
        }
    }

    /// Rebuilds the clock from a saved session. A running session keeps running and its elapsed
    /// time is recomputed for `now`, but no ticks are considered active until [Self::start].
    pub fn restore(
        snapshot: &SessionSnapshot,
        now: DateTime<Utc>,
        max_session: Duration,
        autosave_every_secs: u64,
    ) -> Self {
        let mut clock = Self::new(max_session, autosave_every_secs);
        clock.initial_ms = snapshot.initial_time;
        clock.elapsed_ms = snapshot.elapsed_time;
        clock.start_instant = snapshot.start_time;

        if snapshot.is_running {
            // A run without a start moment can still be resumed from its cached elapsed time.
            let start = snapshot
                .start_time
                .unwrap_or_else(|| start_for(now, snapshot.elapsed_time));
            clock.start_instant = Some(start);
            clock.elapsed_ms = elapsed_between(start, now);
            clock.state = ClockState::Running;
        } else if clock.elapsed_ms > 0 {
            clock.state = ClockState::Paused;
        }
        clock
    }

    /// Session as it should be saved at `now`, with the live elapsed time.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            is_running: self.is_running(),
            start_time: self.start_instant,
            elapsed_time: self.observe(now).elapsed_ms,
            initial_time: self.initial_ms,
            save_timestamp: now,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn initial_ms(&self) -> u64 {
        self.initial_ms
    }

    /// Starts or resumes counting. Returns `false` when the clock was already running with ticks
    /// active, in which case nothing changes.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() && self.ticking {
            return false;
        }

        if self.elapsed_ms > 0 {
            self.start_instant = Some(start_for(now, self.elapsed_ms));
        } else {
            self.start_instant = Some(start_for(now, self.initial_ms));
            self.elapsed_ms = self.initial_ms;
        }
        self.state = ClockState::Running;
        self.ticking = true;
        debug!("Session started at {} ms", self.elapsed_ms);
        true
    }

    /// Freezes elapsed time. Returns `false` if the clock wasn't running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_ms = self.live_elapsed(now);
        self.state = ClockState::Paused;
        self.ticking = false;
        debug!("Session paused at {} ms", self.elapsed_ms);
        true
    }

    pub fn reset(&mut self) {
        self.state = ClockState::Stopped;
        self.ticking = false;
        self.start_instant = None;
        self.elapsed_ms = 0;
        self.initial_ms = 0;
        debug!("Session reset");
    }

    /// Makes the edited time the new elapsed time. A running session keeps running from it.
    pub fn set_initial_from_parts(&mut self, parts: TimeParts, now: DateTime<Utc>) {
        let new_ms = parts.total_ms();
        self.initial_ms = new_ms;
        if self.is_running() {
            self.start_instant = Some(start_for(now, new_ms));
        }
        self.elapsed_ms = new_ms;
        debug!("Session time set to {parts}");
    }

    /// Refreshes the cached elapsed time. Does nothing unless running.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::default();
        }
        self.elapsed_ms = self.live_elapsed(now);
        TickOutcome {
            persist: (self.elapsed_ms / 1000) % self.autosave_every_secs == 0,
        }
    }

    pub fn observe(&self, now: DateTime<Utc>) -> Observation {
        let elapsed_ms = if self.is_running() {
            self.live_elapsed(now)
        } else {
            self.elapsed_ms
        };
        let progress = capped_duration_percentage(millis(elapsed_ms), self.max_session);
        Observation {
            elapsed_ms,
            progress,
            band: IntensityBand::for_progress(progress),
        }
    }

    fn live_elapsed(&self, now: DateTime<Utc>) -> u64 {
        match self.start_instant {
            Some(start) => elapsed_between(start, now),
            None => self.elapsed_ms,
        }
    }
}

fn millis(ms: u64) -> Duration {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX)
}

/// Moment `elapsed_ms` before `now`, pinned to the earliest representable one on overflow.
fn start_for(now: DateTime<Utc>, elapsed_ms: u64) -> DateTime<Utc> {
    now.checked_sub_signed(millis(elapsed_ms))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Milliseconds from `start` to `now`; a start in the future counts as nothing elapsed.
fn elapsed_between(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::session::{parts::TimeParts, snapshot::SessionSnapshot};

    use super::{ClockState, IntensityBand, SessionClock};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn clock() -> SessionClock {
        SessionClock::new(Duration::hours(8), 30)
    }

    #[test]
    fn fresh_start_counts_from_zero() {
        let mut clock = clock();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert!(clock.start(at(0)));
        assert_eq!(clock.observe(at(0)).elapsed_ms, 0);
        assert_eq!(clock.observe(at(5)).elapsed_ms, 5000);
    }

    #[test]
    fn set_while_stopped_is_observed_immediately() {
        let mut clock = clock();
        clock.set_initial_from_parts(TimeParts::clamped(2, 15, 7), at(0));
        assert_eq!(clock.observe(at(100)).elapsed_ms, (2 * 3600 + 15 * 60 + 7) * 1000);
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let mut clock = clock();
        clock.start(at(0));
        assert!(!clock.start(at(10)));
        assert_eq!(clock.observe(at(10)).elapsed_ms, 10_000);
    }

    #[test]
    fn resume_does_not_jump() {
        let mut clock = clock();
        clock.start(at(0));
        clock.pause(at(40));
        let paused = clock.observe(at(40)).elapsed_ms;

        // Time spent paused is not counted.
        assert_eq!(clock.observe(at(500)).elapsed_ms, paused);
        clock.start(at(500));
        assert_eq!(clock.observe(at(500)).elapsed_ms, paused);
        assert!(clock.observe(at(510)).elapsed_ms >= paused);
        assert_eq!(clock.observe(at(510)).elapsed_ms, 50_000);
    }

    #[test]
    fn pause_when_not_running_changes_nothing() {
        let mut clock = clock();
        assert!(!clock.pause(at(3)));
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn reset_from_any_state() {
        let mut running = clock();
        running.set_initial_from_parts(TimeParts::clamped(1, 0, 0), at(0));
        running.start(at(0));

        let mut paused = running.clone();
        paused.pause(at(30));

        for mut clock in [running, paused, self::clock()] {
            clock.reset();
            assert_eq!(clock.state(), ClockState::Stopped);
            assert_eq!(clock.observe(at(100)).elapsed_ms, 0);
            assert_eq!(clock.initial_ms(), 0);
            assert!(!clock.is_ticking());
        }
    }

    #[test]
    fn editing_while_running_keeps_running_from_new_value() {
        let mut clock = clock();
        clock.start(at(0));
        clock.set_initial_from_parts(TimeParts::clamped(0, 10, 0), at(20));
        assert!(clock.is_running());
        assert_eq!(clock.observe(at(20)).elapsed_ms, 600_000);
        assert_eq!(clock.observe(at(25)).elapsed_ms, 605_000);
    }

    #[test]
    fn set_time_start_wait_pause() {
        let mut clock = clock();
        clock.set_initial_from_parts("01:30:00".parse().unwrap(), at(0));
        clock.start(at(0));
        clock.pause(at(90));

        let observation = clock.observe(at(90));
        assert_eq!(observation.elapsed_ms, 5_490_000);
        assert!((observation.progress.fraction() - 0.190625).abs() < 1e-9);
        assert_eq!(observation.band, IntensityBand::Low);
    }

    #[test]
    fn tick_requests_persistence_every_thirty_seconds() {
        let mut clock = clock();
        clock.start(at(0));
        let persisted = (1..=90)
            .filter(|s| clock.tick(at(*s)).persist)
            .collect::<Vec<_>>();
        assert_eq!(persisted, vec![30, 60, 90]);
    }

    #[test]
    fn tick_while_paused_does_nothing() {
        let mut clock = clock();
        clock.set_initial_from_parts(TimeParts::clamped(0, 0, 30), at(0));
        assert!(!clock.tick(at(10)).persist);
        assert_eq!(clock.observe(at(10)).elapsed_ms, 30_000);
    }

    #[test]
    fn progress_bands() {
        let mut clock = clock();
        clock.set_initial_from_parts(TimeParts::clamped(4, 0, 0), at(0));
        assert_eq!(clock.observe(at(0)).band, IntensityBand::Medium);
        clock.set_initial_from_parts(TimeParts::clamped(6, 24, 0), at(0));
        assert_eq!(clock.observe(at(0)).band, IntensityBand::High);

        clock.set_initial_from_parts(TimeParts::clamped(23, 0, 0), at(0));
        assert_eq!(clock.observe(at(0)).progress.fraction(), 1.0);
    }

    #[test]
    fn restored_running_session_counts_downtime() {
        let snapshot = SessionSnapshot {
            is_running: true,
            start_time: Some(at(0)),
            elapsed_time: 10_000,
            initial_time: 0,
            save_timestamp: at(10),
        };
        let mut clock = SessionClock::restore(&snapshot, at(70), Duration::hours(8), 30);
        assert_eq!(clock.state(), ClockState::Running);
        assert!(!clock.is_ticking());
        assert_eq!(clock.observe(at(70)).elapsed_ms, 70_000);

        assert!(clock.start(at(70)));
        assert_eq!(clock.observe(at(71)).elapsed_ms, 71_000);
    }

    #[test]
    fn restored_paused_session_keeps_elapsed() {
        let mut running = clock();
        running.set_initial_from_parts(TimeParts::clamped(0, 1, 0), at(0));
        running.start(at(0));
        running.pause(at(15));
        let snapshot = running.snapshot(at(15));

        let restored = SessionClock::restore(&snapshot, at(3600), Duration::hours(8), 30);
        assert_eq!(restored.state(), ClockState::Paused);
        assert!(!restored.is_running());
        assert_eq!(restored.observe(at(3600)).elapsed_ms, 75_000);
        assert_eq!(restored.initial_ms(), 60_000);
    }

    #[test]
    fn huge_restored_durations_do_not_overflow() {
        for elapsed_time in [u64::MAX, 1 << 63, 1_000_000_000_000_000_000] {
            let snapshot = SessionSnapshot {
                is_running: true,
                start_time: None,
                elapsed_time,
                initial_time: elapsed_time,
                save_timestamp: at(0),
            };
            let mut restored = SessionClock::restore(&snapshot, at(0), Duration::hours(8), 30);
            assert!(restored.is_running());
            assert_eq!(restored.observe(at(1)).band, IntensityBand::High);

            restored.pause(at(1));
            restored.start(at(2));
            restored.tick(at(3));
            assert!(restored.observe(at(3)).elapsed_ms > 0);
        }
    }
}
