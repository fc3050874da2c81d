use chrono::{DateTime, Utc};
use flatmate_core::types::{OrderId, RoomId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// A periodic task: duty recurs every `period` days from `start_at`, and
/// today's executor is computed statelessly from elapsed days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub room_id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    /// Days between duties, always >= 1.
    pub period: i64,
    pub order_id: Option<OrderId>,
}

impl Task {
    /// Inactive tasks never appear in the daily digest.
    pub fn is_inactive(&self, now: DateTime<Utc>) -> bool {
        self.order_id.is_none() || self.start_at > now
    }
}

/// A manual task: duty advances only when someone performs it, via the
/// persisted counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTask {
    pub id: TaskId,
    pub room_id: RoomId,
    pub name: String,
    pub description: Option<String>,
    /// Current rotation position; reset to 0 whenever the order binding
    /// changes.
    pub counter: i64,
    pub order_id: Option<OrderId>,
}

impl ManualTask {
    pub fn is_inactive(&self) -> bool {
        self.order_id.is_none()
    }
}

/// Partial update for a periodic task. Absent fields keep their prior
/// values; clearing optionals goes through `remove_parameters` instead.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub period: Option<i64>,
    pub order_id: Option<OrderId>,
}

/// Partial update for a manual task. A supplied `order_id` resets the
/// counter, even when rebinding to the same order.
#[derive(Debug, Clone, Default)]
pub struct ManualTaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order_id: Option<OrderId>,
}

/// Outcome of evaluating a periodic task for a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodayDuty {
    /// No bound order, or the start date is still in the future.
    Inactive,
    /// Active, but the period does not divide the elapsed days.
    NotToday,
    /// Somebody is on duty today.
    Duty(UserId),
}

/// One line of the daily digest: a task due today and who covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyLine {
    pub task_id: TaskId,
    pub name: String,
    pub user_id: UserId,
}

/// Brief listing entry shared by both task kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBrief {
    pub id: TaskId,
    pub name: String,
    pub inactive: bool,
}
