use anyhow::Result;

use crate::{
    history::{
        ledger::{Aggregates, TodayDisplay},
        records::DayRecord,
    },
    storage::KeyValueStore,
    timer::WorkTimer,
};

/// Command to process `history`. Prints every recorded day followed by the totals.
pub fn print_history<S: KeyValueStore>(timer: &mut WorkTimer<S>) -> Result<()> {
    timer.refresh_aggregates();
    let records = timer.history()?;
    for line in history_lines(&records, timer.view().aggregates) {
        println!("{line}");
    }
    Ok(())
}

fn history_lines(records: &[DayRecord], aggregates: Aggregates) -> Vec<String> {
    let width = records.iter().map(|r| r.day.len()).max().unwrap_or(0);
    let mut lines = records
        .iter()
        .map(|record| {
            format!(
                "{:width$}  {}",
                record.day,
                TodayDisplay::from_seconds(record.seconds)
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Today: {}", aggregates.today_display()));
    lines.push(format!("All time: {}", aggregates.all_time_display()));
    lines
}

#[cfg(test)]
mod tests {
    use crate::history::{ledger::Aggregates, records::DayRecord};

    use super::history_lines;

    #[test]
    fn lists_days_and_totals() {
        let records = vec![
            DayRecord {
                day: "Fri Oct 16 2026".into(),
                seconds: 3600,
            },
            DayRecord {
                day: "legacy".into(),
                seconds: 90 * 60,
            },
        ];
        let lines = history_lines(
            &records,
            Aggregates {
                today_seconds: 3600,
                total_seconds: 9000,
            },
        );
        assert_eq!(
            lines,
            vec![
                "Fri Oct 16 2026  1ч 0м",
                "legacy           1ч 30м",
                "Today: 1ч 0м",
                "All time: 0д 2ч",
            ]
        );
    }
}
