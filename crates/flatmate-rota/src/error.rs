use flatmate_core::types::{OrderId, TaskId, UserId};
use thiserror::Error;

/// Rotation-core errors. The last three variants are internal consistency
/// failures — the gateway maps them to 5xx, everything else to 4xx.
#[derive(Debug, Error)]
pub enum RotaError {
    #[error("order {0} does not exist")]
    OrderNotExist(OrderId),

    #[error("task {0} does not exist")]
    TaskNotExist(TaskId),

    #[error("manual task {0} does not exist")]
    ManualTaskNotExist(TaskId),

    #[error("maximum number of orders reached for the room")]
    TooManyOrders,

    #[error("maximum number of tasks reached for the room")]
    TooManyTasks,

    #[error("user {0} does not exist")]
    SpecifiedUserNotExist(UserId),

    #[error("user {0} does not belong to the room")]
    SpecifiedUserNotInRoom(UserId),

    #[error("the {entity} does not belong to the room")]
    WrongRoom { entity: &'static str },

    /// Perform on a manual task with no bound order.
    #[error("manual task {0} is inactive")]
    Inactive(TaskId),

    /// An empty executor list at creation, or a zero-executor order reaching
    /// rotation arithmetic (which would make both formulas undefined).
    #[error("the order has no executors")]
    EmptyOrder,

    /// Dense-range invariant breach: the computed position has no executor
    /// row. Must never be surfaced as a user-facing 4xx.
    #[error("no executor at position {position} of order {order_id}")]
    MissingExecutor { order_id: OrderId, position: i64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl RotaError {
    /// True for invariant breaches that indicate internal corruption rather
    /// than caller mistakes.
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            RotaError::EmptyOrder | RotaError::MissingExecutor { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RotaError>;
