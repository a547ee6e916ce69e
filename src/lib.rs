//! Work-session stopwatch. It counts the time you spend working, survives restarts, and keeps
//! a per-day history of worked time.
//!
//! [timer::WorkTimer] is the entry point for embedding; [host] runs it in a terminal.

pub mod cli;
pub mod history;
pub mod host;
pub mod session;
pub mod storage;
pub mod timer;
pub mod utils;
