//! Error-to-response mapping: every handler returns `Result<_, Reject>`,
//! and the subsystem errors convert into the coded wire errors here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use flatmate_protocol::ApiError;
use flatmate_rooms::RoomsError;
use flatmate_rota::RotaError;

/// A rejected request: either a coded API error or a shape-validation
/// failure (422 with a plain detail body, mirroring the validation layer).
#[derive(Debug)]
pub enum Reject {
    Api(ApiError),
    Shape(String),
}

impl Reject {
    pub fn shape(detail: impl Into<String>) -> Self {
        Reject::Shape(detail.into())
    }
}

impl IntoResponse for Reject {
    fn into_response(self) -> Response {
        match self {
            Reject::Api(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if err.is_internal() {
                    error!(code = err.code(), detail = %err, "internal error");
                } else {
                    warn!(code = err.code(), detail = %err, "request rejected");
                }
                (status, Json(err.body())).into_response()
            }
            Reject::Shape(detail) => {
                warn!(%detail, "request body failed validation");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(serde_json::json!({ "detail": detail })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ApiError> for Reject {
    fn from(err: ApiError) -> Self {
        Reject::Api(err)
    }
}

impl From<RoomsError> for Reject {
    fn from(err: RoomsError) -> Self {
        let api = match err {
            RoomsError::UserExists(_) | RoomsError::AliasTaken(_) => ApiError::UserExists,
            RoomsError::UserNotExist(_) => ApiError::UserNotExist,
            RoomsError::RoomNotExist => ApiError::RoomNotExist,
            RoomsError::UserWithoutRoom(_) => ApiError::UserWithoutRoom,
            RoomsError::UserHasRoom(_) => ApiError::UserHasRoom,
            RoomsError::TooManyInvitations(_) => ApiError::TooManyInvitations,
            RoomsError::InvitationAlreadySent => ApiError::InvitationAlreadySent,
            RoomsError::InvitationNotExist(_) => ApiError::InvitationNotExist,
            RoomsError::InvitationExpired(_) => ApiError::InvitationExpired,
            RoomsError::NotAddressee => ApiError::NotYoursInvitation,
            RoomsError::NotSender => ApiError::NotYourInvitation,
            RoomsError::WrongRoom { entity } => ApiError::WrongRoom { entity },
            RoomsError::Database(e) => ApiError::Database {
                detail: e.to_string(),
            },
        };
        Reject::Api(api)
    }
}

impl From<RotaError> for Reject {
    fn from(err: RotaError) -> Self {
        let api = match err {
            RotaError::OrderNotExist(_) => ApiError::OrderNotExist,
            RotaError::TaskNotExist(_) => ApiError::TaskNotExist,
            RotaError::ManualTaskNotExist(_) => ApiError::ManualTaskNotExist,
            RotaError::TooManyOrders => ApiError::TooManyOrders,
            RotaError::TooManyTasks => ApiError::TooManyTasks,
            RotaError::SpecifiedUserNotExist(user_id) => {
                ApiError::SpecifiedUserNotExist { user_id }
            }
            RotaError::SpecifiedUserNotInRoom(user_id) => {
                ApiError::SpecifiedUserNotInRoom { user_id }
            }
            RotaError::WrongRoom { entity } => ApiError::WrongRoom { entity },
            RotaError::Inactive(_) => ApiError::ManualTaskInactive,
            err @ (RotaError::EmptyOrder | RotaError::MissingExecutor { .. }) => {
                ApiError::Consistency {
                    detail: err.to_string(),
                }
            }
            RotaError::Database(e) => ApiError::Database {
                detail: e.to_string(),
            },
        };
        Reject::Api(api)
    }
}
