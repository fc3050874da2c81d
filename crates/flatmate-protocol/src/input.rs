//! Request payloads of the bot API.
//!
//! Every request carries the acting `user_id` at the top level; operation
//! parameters sit in a nested object keyed by entity (`task`, `order`,
//! `invitation`, ...) or as a flat id field, matching the bot client's
//! existing envelopes. Patch bodies use `Option` per field: absent means
//! "leave unchanged", never "clear" — clearing goes through the dedicated
//! `remove_parameters` bodies.

use chrono::{DateTime, Utc};
use flatmate_core::types::{InvitationId, OrderId, RuleId, TaskId, UserId};
use serde::{Deserialize, Serialize};

// ── user ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAliasRequest {
    pub user_id: UserId,
    /// Absent or null clears the alias.
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFullnameRequest {
    pub user_id: UserId,
    pub fullname: String,
}

/// Shared envelope for operations that only need the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOnlyRequest {
    pub user_id: UserId,
}

// ── room ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub user_id: UserId,
    pub room: CreateRoomBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomBody {
    pub name: String,
}

// ── invitation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRequest {
    pub user_id: UserId,
    pub addressee: InviteBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteBody {
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationActionRequest {
    pub user_id: UserId,
    pub invitation: InvitationRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationRef {
    pub id: InvitationId,
}

// ── order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub order: CreateOrderBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderBody {
    /// Rotation sequence; position = list index. Duplicates allowed.
    pub users: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInfoRequest {
    pub user_id: UserId,
    pub order: OrderRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRef {
    pub id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIdRequest {
    pub user_id: UserId,
    pub order_id: OrderId,
}

// ── periodic task ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub user_id: UserId,
    pub task: CreateTaskBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskBody {
    pub name: String,
    #[serde(default = "default_description")]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    /// Period in days, must be >= 1.
    pub period: i64,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyTaskRequest {
    pub user_id: UserId,
    pub task: ModifyTaskBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyTaskBody {
    pub id: TaskId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub period: Option<i64>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTaskParametersRequest {
    pub user_id: UserId,
    pub task: RemoveTaskParametersBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTaskParametersBody {
    pub id: TaskId,
    #[serde(default)]
    pub description: bool,
    #[serde(default)]
    pub order_id: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfoRequest {
    pub user_id: UserId,
    pub task: TaskRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: TaskId,
}

/// Flat-id envelope used by task/delete and the manual-task id operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdRequest {
    pub user_id: UserId,
    pub task_id: TaskId,
}

// ── manual task ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManualTaskRequest {
    pub user_id: UserId,
    pub task: CreateManualTaskBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManualTaskBody {
    pub name: String,
    #[serde(default = "default_description")]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyManualTaskRequest {
    pub user_id: UserId,
    pub task: ModifyManualTaskBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyManualTaskBody {
    pub id: TaskId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveManualTaskParametersRequest {
    pub user_id: UserId,
    pub task: RemoveTaskParametersBody,
}

// ── rule ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRuleRequest {
    pub user_id: UserId,
    pub rule: CreateRuleBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRuleBody {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRuleRequest {
    pub user_id: UserId,
    pub rule: EditRuleBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRuleBody {
    pub id: RuleId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleIdRequest {
    pub user_id: UserId,
    pub rule_id: RuleId,
}

/// An omitted description defaults to the empty string, not to "no change" —
/// the create bodies always produce a stored value.
fn default_description() -> Option<String> {
    Some(String::new())
}
