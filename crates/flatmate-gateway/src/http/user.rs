use std::sync::Arc;

use axum::{extract::State, Json};
use flatmate_core::types::UserId;
use flatmate_protocol::input::{CreateUserRequest, SaveAliasRequest, SaveFullnameRequest};

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/user/create — register a user under their platform id.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserId>, Reject> {
    let id = state.directory.create_user(req.user_id)?;
    Ok(Json(id))
}

/// POST /bot/user/save_alias — set or clear the alias.
pub async fn save_alias(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveAliasRequest>,
) -> Result<Json<bool>, Reject> {
    if let Some(ref alias) = req.alias {
        super::check_name(alias)?;
    }
    state.directory.save_alias(req.user_id, req.alias.as_deref())?;
    Ok(Json(true))
}

/// POST /bot/user/save_fullname
pub async fn save_fullname(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveFullnameRequest>,
) -> Result<Json<bool>, Reject> {
    super::check_name(&req.fullname)?;
    state.directory.save_fullname(req.user_id, &req.fullname)?;
    Ok(Json(true))
}
