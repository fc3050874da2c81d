use std::sync::Arc;

use axum::{extract::State, Json};
use flatmate_core::types::TaskId;
use flatmate_protocol::input::{
    CreateManualTaskRequest, ModifyManualTaskRequest, RemoveManualTaskParametersRequest,
    TaskIdRequest, TaskInfoRequest, UserOnlyRequest,
};
use flatmate_protocol::output::{
    ManualTaskCurrentResponse, ManualTaskInfoResponse, ManualTaskListResponse, TaskBriefInfo,
};
use flatmate_rota::ManualTaskPatch;

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/manual_task/create — returns the new task's id.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateManualTaskRequest>,
) -> Result<Json<TaskId>, Reject> {
    super::check_name(&req.task.name)?;
    super::check_description(req.task.description.as_deref(), super::MAX_DESCRIPTION_CREATE)?;
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let id = state.manual.create(
        room_id,
        &req.task.name,
        req.task.description.as_deref(),
        req.task.order_id,
    )?;
    Ok(Json(id))
}

/// POST /bot/manual_task/modify — a supplied `order_id` resets the counter,
/// even when rebinding to the same order.
pub async fn modify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModifyManualTaskRequest>,
) -> Result<Json<bool>, Reject> {
    if let Some(ref name) = req.task.name {
        super::check_name(name)?;
    }
    super::check_description(req.task.description.as_deref(), super::MAX_DESCRIPTION_MODIFY)?;
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let patch = ManualTaskPatch {
        name: req.task.name,
        description: req.task.description,
        order_id: req.task.order_id,
    };
    state.manual.modify(room_id, req.task.id, &patch)?;
    Ok(Json(true))
}

/// POST /bot/manual_task/remove_parameters
pub async fn remove_parameters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveManualTaskParametersRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state
        .manual
        .remove_parameters(room_id, req.task.id, req.task.description, req.task.order_id)?;
    Ok(Json(true))
}

/// POST /bot/manual_task/list — every manual task of the room.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<ManualTaskListResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let tasks = state
        .manual
        .list(room_id)?
        .into_iter()
        .map(|t| TaskBriefInfo {
            id: t.id,
            name: t.name,
            inactive: t.inactive,
        })
        .collect();
    Ok(Json(ManualTaskListResponse { tasks }))
}

/// POST /bot/manual_task/info
pub async fn info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskInfoRequest>,
) -> Result<Json<ManualTaskInfoResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let task = state.manual.info(room_id, req.task.id)?;
    Ok(Json(ManualTaskInfoResponse {
        name: task.name,
        description: task.description,
        order_id: task.order_id,
    }))
}

/// POST /bot/manual_task/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskIdRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state.manual.delete(room_id, req.task_id)?;
    Ok(Json(true))
}

/// POST /bot/manual_task/do — advance the rotation; returns the new counter.
pub async fn perform(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskIdRequest>,
) -> Result<Json<i64>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let counter = state.manual.perform(room_id, req.task_id)?;
    Ok(Json(counter))
}

/// POST /bot/manual_task/current_executor — who holds the duty right now.
pub async fn current_executor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskIdRequest>,
) -> Result<Json<ManualTaskCurrentResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let (number, user_id) = state.manual.current_executor(room_id, req.task_id)?;
    let users = state.directory.users_by_ids(&[user_id])?;
    let user = users.first().map(super::user_info).ok_or_else(|| {
        flatmate_protocol::ApiError::Consistency {
            detail: format!("executor {user_id} is no longer registered"),
        }
    })?;
    Ok(Json(ManualTaskCurrentResponse { number, user }))
}
