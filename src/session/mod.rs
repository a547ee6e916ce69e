//! The current work session: [clock::SessionClock] holds running/paused/elapsed state and
//! [snapshot] moves it in and out of the store so a session survives restarts.

pub mod clock;
pub mod parts;
pub mod snapshot;
