//! The periodic rotation math: pure functions of instants, no store access.
//!
//! All three functions truncate to whole elapsed days, so every evaluation
//! within one calendar day of the start instant yields the same answer.

use chrono::{DateTime, Utc};

/// Whole days elapsed from `start` to `now`, truncated (a 47-hour gap is one
/// day).
pub fn days_between(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_days()
}

/// A periodic task is on duty iff its period divides the elapsed days.
/// With `period = 1` this is true on every day once the task is active.
pub fn is_today_duty(start: DateTime<Utc>, period: i64, now: DateTime<Utc>) -> bool {
    days_between(start, now) % period == 0
}

/// Position of today's executor: the number of completed rotation steps,
/// wrapped around the executor count.
pub fn today_index(start: DateTime<Utc>, period: i64, now: DateTime<Utc>, count: i64) -> i64 {
    days_between(start, now) / period % count
}
