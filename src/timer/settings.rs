use std::time::Duration as StdDuration;

use chrono::Duration;

/// Length of a full work session. Only used to scale the progress bar.
pub const DEFAULT_MAX_SESSION: Duration = Duration::hours(8);
/// Saved sessions older than this are thrown away instead of resumed.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::hours(24);
pub const DEFAULT_AUTOSAVE_EVERY_SECS: u64 = 30;
pub const DEFAULT_TICK_INTERVAL: StdDuration = StdDuration::from_secs(1);
pub const DEFAULT_AGGREGATE_REFRESH: StdDuration = StdDuration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct TimerSettings {
    pub max_session: Duration,
    pub staleness_window: Duration,
    pub autosave_every_secs: u64,
    pub tick_interval: StdDuration,
    pub aggregate_refresh: StdDuration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            max_session: DEFAULT_MAX_SESSION,
            staleness_window: DEFAULT_STALENESS_WINDOW,
            autosave_every_secs: DEFAULT_AUTOSAVE_EVERY_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            aggregate_refresh: DEFAULT_AGGREGATE_REFRESH,
        }
    }
}
