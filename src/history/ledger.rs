use std::fmt::Display;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::utils::time::date_to_day_key;

use super::records::{DayRecord, DayRecordStore};

const SECONDS_IN_DAY: u64 = 24 * 3600;

/// Worked time of the current day and of all days together, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aggregates {
    pub today_seconds: u64,
    pub total_seconds: u64,
}

impl Aggregates {
    pub fn today_display(&self) -> TodayDisplay {
        TodayDisplay::from_seconds(self.today_seconds)
    }

    pub fn all_time_display(&self) -> AllTimeDisplay {
        AllTimeDisplay::from_seconds(self.total_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayDisplay {
    pub hours: u64,
    pub minutes: u64,
}

impl TodayDisplay {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }
}

impl Display for TodayDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ч {}м", self.hours, self.minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllTimeDisplay {
    pub days: u64,
    pub hours: u64,
}

impl AllTimeDisplay {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            days: seconds / SECONDS_IN_DAY,
            hours: (seconds % SECONDS_IN_DAY) / 3600,
        }
    }
}

impl Display for AllTimeDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}д {}ч", self.days, self.hours)
    }
}

/// Accounting rules for per-day totals.
///
/// The "today" accumulator is overwritten with the elapsed time of the running session rather
/// than incremented, so a session spanning midnight is credited wholly to the day it is observed
/// on. Running several independent sessions on one day would lose the earlier ones.
pub struct HistoryLedger<R> {
    records: R,
}

impl<R: DayRecordStore> HistoryLedger<R> {
    pub fn new(records: R) -> Self {
        Self { records }
    }

    /// Starts a new "today" accumulator when the calendar day changed. Previous days stay
    /// archived under their own key. Returns whether a rollover happened.
    pub fn rollover_if_new_day(&mut self, today: NaiveDate) -> Result<bool> {
        let today = date_to_day_key(today);
        if self.records.today_marker()?.as_deref() == Some(today.as_str()) {
            return Ok(false);
        }
        info!("New day {today}, starting today's total from zero");
        self.records.set_today_marker(&today)?;
        self.records.set_today_seconds(0)?;
        Ok(true)
    }

    pub fn record_if_running(&mut self, elapsed_seconds: u64, is_running: bool) -> Result<()> {
        if is_running {
            self.records.set_today_seconds(elapsed_seconds)?;
        }
        Ok(())
    }

    pub fn archive_today(&mut self, today: NaiveDate, today_seconds: u64) -> Result<()> {
        self.records.put_day_record(&DayRecord {
            day: date_to_day_key(today),
            seconds: today_seconds,
        })
    }

    pub fn today_seconds(&self) -> Result<u64> {
        self.records.today_seconds()
    }

    /// Today's accumulator plus every archived day other than today.
    pub fn total_all_time(&self, today: NaiveDate) -> Result<u64> {
        let today = date_to_day_key(today);
        let archived = self
            .records
            .list_day_records()?
            .into_iter()
            .filter(|record| record.day != today)
            .map(|record| record.seconds)
            .fold(0u64, u64::saturating_add);
        Ok(self.records.today_seconds()?.saturating_add(archived))
    }

    pub fn records(&self) -> Result<Vec<DayRecord>> {
        self.records.list_day_records()
    }

    /// Brings totals up to date with the session: rollover, record, archive, then sum.
    pub fn refresh(
        &mut self,
        today: NaiveDate,
        elapsed_ms: u64,
        is_running: bool,
    ) -> Result<Aggregates> {
        self.rollover_if_new_day(today)?;
        self.record_if_running(elapsed_ms / 1000, is_running)?;
        let today_seconds = self.today_seconds()?;
        self.archive_today(today, today_seconds)?;
        let aggregates = Aggregates {
            today_seconds,
            total_seconds: self.total_all_time(today)?,
        };
        debug!("Refreshed totals {aggregates:?}");
        Ok(aggregates)
    }
}
