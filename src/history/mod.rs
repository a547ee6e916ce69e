//! Per-day totals of worked time. [ledger::HistoryLedger] holds the accounting rules, while
//! [records::DayRecordStore] hides where the numbers live.

pub mod ledger;
pub mod records;
