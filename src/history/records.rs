use anyhow::Result;
use tracing::warn;

use crate::{session::parts::lenient_int, storage::KeyValueStore};

pub const TODAY_DATE_KEY: &str = "todayDate";
pub const TODAY_WORK_TIME_KEY: &str = "todayWorkTime";
pub const DAY_RECORD_PREFIX: &str = "workTime_";

/// Seconds worked during one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub day: String,
    pub seconds: u64,
}

/// Interface for abstracting storage of day records. Records are only ever created or
/// overwritten, never deleted.
pub trait DayRecordStore {
    /// Day the "today" accumulator belongs to.
    fn today_marker(&self) -> Result<Option<String>>;

    fn set_today_marker(&mut self, day: &str) -> Result<()>;

    fn today_seconds(&self) -> Result<u64>;

    fn set_today_seconds(&mut self, seconds: u64) -> Result<()>;

    fn list_day_records(&self) -> Result<Vec<DayRecord>>;

    fn put_day_record(&mut self, record: &DayRecord) -> Result<()>;
}

/// Lays day records out over a flat [KeyValueStore], one `workTime_<day>` key per day.
pub struct KeyValueDayRecords<'a, S> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore> KeyValueDayRecords<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    fn read_seconds(&self, key: &str) -> Result<u64> {
        Ok(self
            .store
            .get(key)?
            .map(|raw| parse_seconds(key, &raw))
            .unwrap_or(0))
    }
}

/// Reads the leading number of seconds, ignoring any trailing junk. Values without one, or
/// negative ones, count as nothing worked.
fn parse_seconds(key: &str, raw: &str) -> u64 {
    if let Ok(v) = raw.trim().parse::<u64>() {
        return v;
    }
    let seconds = lenient_int(raw).max(0) as u64;
    warn!("Value {raw:?} under {key} is not a plain number of seconds, using {seconds}");
    seconds
}

impl<S: KeyValueStore> DayRecordStore for KeyValueDayRecords<'_, S> {
    fn today_marker(&self) -> Result<Option<String>> {
        self.store.get(TODAY_DATE_KEY)
    }

    fn set_today_marker(&mut self, day: &str) -> Result<()> {
        self.store.set(TODAY_DATE_KEY, day)
    }

    fn today_seconds(&self) -> Result<u64> {
        self.read_seconds(TODAY_WORK_TIME_KEY)
    }

    fn set_today_seconds(&mut self, seconds: u64) -> Result<()> {
        self.store.set(TODAY_WORK_TIME_KEY, &seconds.to_string())
    }

    fn list_day_records(&self) -> Result<Vec<DayRecord>> {
        let mut records = vec![];
        for key in self.store.keys()? {
            let Some(day) = key.strip_prefix(DAY_RECORD_PREFIX) else {
                continue;
            };
            records.push(DayRecord {
                day: day.to_owned(),
                seconds: self.read_seconds(&key)?,
            });
        }
        Ok(records)
    }

    fn put_day_record(&mut self, record: &DayRecord) -> Result<()> {
        self.store.set(
            &format!("{DAY_RECORD_PREFIX}{}", record.day),
            &record.seconds.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::storage::memory_store::MemoryStore;

    use super::{DayRecord, DayRecordStore, KeyValueDayRecords};

    #[test]
    fn lists_only_day_keys() -> Result<()> {
        let mut store = MemoryStore::from_iter([
            ("workTime_Thu Oct 15 2026", "3600"),
            ("workTime_Wed Oct 14 2026", "oops"),
            ("todayWorkTime", "10"),
            ("workTimer", "{}"),
        ]);
        let records = KeyValueDayRecords::new(&mut store);

        let mut listed = records.list_day_records()?;
        listed.sort_by(|a, b| a.day.cmp(&b.day));
        assert_eq!(
            listed,
            vec![
                DayRecord {
                    day: "Thu Oct 15 2026".into(),
                    seconds: 3600
                },
                DayRecord {
                    day: "Wed Oct 14 2026".into(),
                    seconds: 0
                },
            ]
        );
        assert_eq!(records.today_seconds()?, 10);
        Ok(())
    }

    #[test]
    fn leading_number_is_kept() -> Result<()> {
        let mut store = MemoryStore::from_iter([
            ("todayWorkTime", "3600abc"),
            ("workTime_Thu Oct 15 2026", "-5"),
            ("workTime_Wed Oct 14 2026", " 120 "),
        ]);
        let records = KeyValueDayRecords::new(&mut store);
        assert_eq!(records.today_seconds()?, 3600);

        let mut listed = records.list_day_records()?;
        listed.sort_by(|a, b| a.day.cmp(&b.day));
        assert_eq!(
            listed.iter().map(|r| r.seconds).collect::<Vec<_>>(),
            vec![0, 120]
        );
        Ok(())
    }

    #[test]
    fn missing_today_reads_as_zero() -> Result<()> {
        let mut store = MemoryStore::new();
        let mut records = KeyValueDayRecords::new(&mut store);
        assert_eq!(records.today_seconds()?, 0);
        assert_eq!(records.today_marker()?, None);

        records.put_day_record(&DayRecord {
            day: "Fri Oct 16 2026".into(),
            seconds: 42,
        })?;
        assert_eq!(records.list_day_records()?.len(), 1);
        Ok(())
    }
}
