use flatmate_core::types::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coded bot API error. The numeric codes are a compatibility contract with
/// the bot client — never renumber, only append.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // token errors (401/403)
    #[error("No access token provided")]
    NoToken,
    #[error("Invalid access token")]
    InvalidToken,
    #[error("Access token has expired")]
    TokenExpired,
    #[error("Invalid token for bot's access")]
    BotAccess,

    // API errors (400)
    #[error("The user already exists")]
    UserExists,
    #[error("The user does not exist")]
    UserNotExist,
    #[error("The room does not exist")]
    RoomNotExist,
    #[error("The user does not have a room")]
    UserWithoutRoom,
    #[error("The user already has a room")]
    UserHasRoom,
    #[error("The order does not exist")]
    OrderNotExist,
    #[error("The task does not exist")]
    TaskNotExist,
    #[error("Maximum number of invitations is reached for the user")]
    TooManyInvitations,
    #[error("Such an invitation is already sent")]
    InvitationAlreadySent,
    #[error("The invitation is not found")]
    InvitationNotExist,
    #[error("The invitation is not addressed to this user")]
    NotYoursInvitation,
    #[error("Maximum number of orders is reached for the room")]
    TooManyOrders,
    #[error("Maximum number of tasks is reached for the room")]
    TooManyTasks,
    #[error("The user {user_id} does not belong to the room")]
    SpecifiedUserNotInRoom { user_id: UserId },
    #[error("The user {user_id} does not exist")]
    SpecifiedUserNotExist { user_id: UserId },
    #[error("The {entity} does not belong to the room")]
    WrongRoom { entity: &'static str },
    #[error("The invitation has expired")]
    InvitationExpired,
    #[error("The invitation was not sent by this user")]
    NotYourInvitation,
    #[error("The manual task does not exist")]
    ManualTaskNotExist,
    #[error("The manual task is inactive")]
    ManualTaskInactive,

    // internal errors (500)
    #[error("Internal consistency violation: {detail}")]
    Consistency { detail: String },
    #[error("Database failure: {detail}")]
    Database { detail: String },
}

impl ApiError {
    /// Stable machine-readable code carried in the response body.
    pub fn code(&self) -> u16 {
        match self {
            ApiError::NoToken => 1,
            ApiError::InvalidToken => 2,
            ApiError::TokenExpired => 3,
            ApiError::BotAccess => 11,
            ApiError::UserExists => 101,
            ApiError::UserNotExist => 102,
            ApiError::RoomNotExist => 104,
            ApiError::UserWithoutRoom => 105,
            ApiError::UserHasRoom => 106,
            ApiError::OrderNotExist => 107,
            ApiError::TaskNotExist => 108,
            ApiError::TooManyInvitations => 109,
            ApiError::InvitationAlreadySent => 110,
            ApiError::InvitationNotExist => 111,
            ApiError::NotYoursInvitation => 112,
            ApiError::TooManyOrders => 113,
            ApiError::TooManyTasks => 114,
            ApiError::SpecifiedUserNotInRoom { .. } => 115,
            ApiError::SpecifiedUserNotExist { .. } => 116,
            ApiError::WrongRoom { .. } => 117,
            ApiError::InvitationExpired => 118,
            ApiError::NotYourInvitation => 119,
            ApiError::ManualTaskNotExist => 120,
            ApiError::ManualTaskInactive => 121,
            ApiError::Consistency { .. } => 150,
            ApiError::Database { .. } => 151,
        }
    }

    /// HTTP status the gateway responds with.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NoToken | ApiError::InvalidToken | ApiError::TokenExpired => 401,
            ApiError::BotAccess => 403,
            ApiError::Consistency { .. } | ApiError::Database { .. } => 500,
            _ => 400,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            detail: self.to_string(),
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub detail: String,
}
