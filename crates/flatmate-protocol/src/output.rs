//! Response payloads of the bot API.
//!
//! Nullable fields serialize as explicit `null` (no field skipping) — the bot
//! client pattern-matches whole objects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use flatmate_core::types::{InvitationId, OrderId, RoomId, RuleId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Public view of a user, embedded in room/invitation/order responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub alias: Option<String>,
    pub fullname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfoResponse {
    pub id: RoomId,
    pub name: String,
    pub users: Vec<UserInfo>,
}

/// One duty line of the daily digest: the task and who covers it today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDailyInfo {
    pub id: TaskId,
    pub name: String,
    pub today_executor: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyInfoResponse {
    pub periodic_tasks: Vec<TaskDailyInfo>,
    pub manual_tasks: Vec<TaskDailyInfo>,
    /// Details for every user id referenced above. Integer keys serialize as
    /// JSON strings.
    pub user_info: BTreeMap<UserId, UserInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOfOrdersResponse {
    pub users: Vec<UserInfo>,
    /// order id -> user ids in rotation sequence.
    pub orders: BTreeMap<OrderId, Vec<UserId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInfoResponse {
    /// Executors in rotation sequence; a user appears once per slot held.
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBriefInfo {
    pub id: TaskId,
    pub name: String,
    pub inactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskBriefInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfoResponse {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub period: i64,
    pub order_id: Option<OrderId>,
    pub inactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTaskListResponse {
    pub tasks: Vec<TaskBriefInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTaskInfoResponse {
    pub name: String,
    pub description: Option<String>,
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTaskCurrentResponse {
    /// Current counter value, i.e. the executor position on duty.
    pub number: i64,
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingInvitationInfo {
    pub id: InvitationId,
    pub sender: UserInfo,
    pub room: RoomId,
    pub room_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingInvitationsResponse {
    pub invitations: Vec<IncomingInvitationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentInvitationInfo {
    pub id: InvitationId,
    pub addressee: String,
    pub room: RoomId,
    pub room_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentInvitationsResponse {
    pub invitations: Vec<SentInvitationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: RuleId,
    pub name: String,
    pub text: String,
}
