//! [WorkTimer] binds the session clock and the history ledger to a store and a clock. This is
//! what a UI drives: it applies user actions, keeps the store up to date and produces a
//! [TimerView] with everything worth showing.

pub mod settings;

use std::{fmt::Display, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, Local};
use settings::TimerSettings;
use tracing::{error, info, instrument, warn};

use crate::{
    history::{
        ledger::{Aggregates, HistoryLedger},
        records::{DayRecord, KeyValueDayRecords},
    },
    session::{
        clock::{ClockState, Observation, SessionClock},
        parts::TimeParts,
        snapshot::{load_snapshot, save_snapshot},
    },
    storage::KeyValueStore,
    utils::{clock::Clock, time::clock_caption},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCaption {
    Working,
    Paused,
    TimeSet,
    Reset,
}

impl Display for StatusCaption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caption = match self {
            StatusCaption::Working => "Working…",
            StatusCaption::Paused => "Paused",
            StatusCaption::TimeSet => "Time set",
            StatusCaption::Reset => "Reset",
        };
        f.write_str(caption)
    }
}

/// Everything a UI shows about the timer at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerView {
    pub state: ClockState,
    pub observation: Observation,
    pub status: Option<StatusCaption>,
    pub start_enabled: bool,
    pub pause_enabled: bool,
    /// `HH:MM` of the last successful save.
    pub saved_at: Option<String>,
    pub aggregates: Aggregates,
}

pub struct WorkTimer<S> {
    store: S,
    clock: Arc<dyn Clock>,
    settings: TimerSettings,
    session: SessionClock,
    status: Option<StatusCaption>,
    saved_at: Option<DateTime<Local>>,
    aggregates: Aggregates,
}

impl<S: KeyValueStore> WorkTimer<S> {
    /// Restores the saved session, or starts a fresh one when there is nothing usable. A session
    /// that was running when saved is resumed.
    pub fn open(mut store: S, clock: Arc<dyn Clock>, settings: TimerSettings) -> Self {
        let now = clock.time();
        let snapshot = load_snapshot(&mut store, now, settings.staleness_window)
            .inspect_err(|e| error!("Failed to read the saved session, starting fresh: {e:?}"))
            .ok()
            .flatten();

        let session = match &snapshot {
            Some(snapshot) => {
                info!("Restoring session saved at {}", snapshot.save_timestamp);
                SessionClock::restore(
                    snapshot,
                    now,
                    settings.max_session,
                    settings.autosave_every_secs,
                )
            }
            None => SessionClock::new(settings.max_session, settings.autosave_every_secs),
        };

        let mut timer = Self {
            store,
            clock,
            settings,
            session,
            status: None,
            saved_at: None,
            aggregates: Aggregates::default(),
        };
        timer.refresh_aggregates();

        if timer.session.is_running() {
            if let Err(e) = timer.start() {
                warn!("Resumed the session but couldn't save it: {e:?}");
            }
        }
        timer
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionClock {
        &self.session
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<()> {
        if !self.session.start(self.clock.time()) {
            return Ok(());
        }
        self.status = Some(StatusCaption::Working);
        self.persist()
    }

    #[instrument(skip(self))]
    pub fn pause(&mut self) -> Result<()> {
        if !self.session.pause(self.clock.time()) {
            return Ok(());
        }
        self.status = Some(StatusCaption::Paused);
        self.persist()
    }

    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Result<()> {
        self.session.reset();
        self.status = Some(StatusCaption::Reset);
        self.persist()
    }

    #[instrument(skip(self))]
    pub fn set_time(&mut self, parts: TimeParts) -> Result<()> {
        self.session.set_initial_from_parts(parts, self.clock.time());
        self.status = Some(if self.session.is_running() {
            StatusCaption::Working
        } else {
            StatusCaption::TimeSet
        });
        self.persist()
    }

    /// Called once per second while running. Errors are logged, never returned, so a broken
    /// store can't stop the timer.
    pub fn tick(&mut self) {
        let outcome = self.session.tick(self.clock.time());
        self.refresh_aggregates();
        if outcome.persist {
            self.flush();
        }
    }

    /// Recomputes today's and all-time totals.
    pub fn refresh_aggregates(&mut self) {
        let now = self.clock.time();
        let today = self.clock.today();
        let observation = self.session.observe(now);
        let running = self.session.is_running();
        match HistoryLedger::new(KeyValueDayRecords::new(&mut self.store)).refresh(
            today,
            observation.elapsed_ms,
            running,
        ) {
            Ok(aggregates) => self.aggregates = aggregates,
            Err(e) => error!("Failed to refresh worked time totals: {e:?}"),
        }
    }

    /// Final save, e.g. before the process goes away.
    pub fn flush(&mut self) {
        if let Err(e) = self.persist() {
            error!("Failed to save the session: {e:?}");
        }
    }

    /// All archived days, most recent first. Days whose key can't be read as a date come last.
    pub fn history(&mut self) -> Result<Vec<DayRecord>> {
        let mut records = HistoryLedger::new(KeyValueDayRecords::new(&mut self.store)).records()?;
        records.sort_by_key(|record| {
            std::cmp::Reverse(chrono::NaiveDate::parse_from_str(&record.day, "%a %b %d %Y").ok())
        });
        Ok(records)
    }

    pub fn view(&self) -> TimerView {
        let running = self.session.is_running();
        TimerView {
            state: self.session.state(),
            observation: self.session.observe(self.clock.time()),
            status: self.status,
            start_enabled: !running,
            pause_enabled: running,
            saved_at: self.saved_at.as_ref().map(clock_caption),
            aggregates: self.aggregates,
        }
    }

    fn persist(&mut self) -> Result<()> {
        let now = self.clock.time();
        save_snapshot(&mut self.store, &self.session.snapshot(now))?;
        self.saved_at = Some(now.with_timezone(&Local));
        Ok(())
    }
}
