use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

pub const SESSION_KEY: &str = "workTimer";

/// Longest elapsed or initial time a saved session may carry. Anything above is treated as
/// garbage rather than worked time.
pub const MAX_STORED_MS: u64 = 100 * 365 * 24 * 3600 * 1000;

/// The struct used for storing the session in the store. Field names are kept compatible with
/// timers saved by the browser version.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_running: bool,
    /// Moment corresponding to zero elapsed time of the current run.
    #[serde(with = "optional_ts_millis")]
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_time: u64,
    #[serde(default)]
    pub initial_time: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub save_timestamp: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Whether the stored durations are small enough to do time arithmetic with.
    pub fn in_range(&self) -> bool {
        self.elapsed_time <= MAX_STORED_MS && self.initial_time <= MAX_STORED_MS
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.save_timestamp
    }
}

/// Zero on the wire means there is no start moment.
mod optional_ts_millis {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.map_or(0, |v| v.timestamp_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        if millis == 0 {
            return Ok(None);
        }
        DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp {millis} is out of range")))
    }
}

/// Reads the saved session. Returns `None` when there is nothing usable: no snapshot, a snapshot
/// that can't be parsed, or one older than `staleness`. Stale snapshots are removed from the
/// store. Only failures of the store itself are returned as errors.
pub fn load_snapshot(
    store: &mut impl KeyValueStore,
    now: DateTime<Utc>,
    staleness: Duration,
) -> Result<Option<SessionSnapshot>> {
    let Some(raw) = store.get(SESSION_KEY)? else {
        debug!("No saved session");
        return Ok(None);
    };

    let snapshot = match serde_json::from_str::<SessionSnapshot>(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Saved session {raw:?} is malformed, ignoring it: {e}");
            return Ok(None);
        }
    };

    if !snapshot.in_range() {
        warn!(
            "Saved session has out of range times ({} ms elapsed, {} ms initial), ignoring it",
            snapshot.elapsed_time, snapshot.initial_time
        );
        return Ok(None);
    }

    if snapshot.age(now) >= staleness {
        info!(
            "Saved session from {} is stale, starting fresh",
            snapshot.save_timestamp
        );
        store.remove(SESSION_KEY)?;
        return Ok(None);
    }

    Ok(Some(snapshot))
}

pub fn save_snapshot(store: &mut impl KeyValueStore, snapshot: &SessionSnapshot) -> Result<()> {
    let serialized = serde_json::to_string(snapshot)?;
    store.set(SESSION_KEY, &serialized)?;
    debug!("Saved session {serialized}");
    Ok(())
}
