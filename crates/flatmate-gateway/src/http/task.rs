use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use flatmate_core::types::TaskId;
use flatmate_protocol::input::{
    CreateTaskRequest, ModifyTaskRequest, RemoveTaskParametersRequest, TaskIdRequest,
    TaskInfoRequest, UserOnlyRequest,
};
use flatmate_protocol::output::{TaskBriefInfo, TaskInfoResponse, TaskListResponse};
use flatmate_rota::TaskPatch;

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/task/create — returns the new task's id.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskId>, Reject> {
    super::check_name(&req.task.name)?;
    super::check_description(req.task.description.as_deref(), super::MAX_DESCRIPTION_CREATE)?;
    super::check_period(req.task.period)?;
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let id = state.tasks.create(
        room_id,
        &req.task.name,
        req.task.description.as_deref(),
        req.task.start_date,
        req.task.period,
        req.task.order_id,
    )?;
    Ok(Json(id))
}

/// POST /bot/task/modify — partial update; absent fields stay untouched.
pub async fn modify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModifyTaskRequest>,
) -> Result<Json<bool>, Reject> {
    if let Some(ref name) = req.task.name {
        super::check_name(name)?;
    }
    super::check_description(req.task.description.as_deref(), super::MAX_DESCRIPTION_MODIFY)?;
    if let Some(period) = req.task.period {
        super::check_period(period)?;
    }
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let patch = TaskPatch {
        name: req.task.name,
        description: req.task.description,
        start_at: req.task.start_date,
        period: req.task.period,
        order_id: req.task.order_id,
    };
    state.tasks.modify(room_id, req.task.id, &patch)?;
    Ok(Json(true))
}

/// POST /bot/task/remove_parameters — clear description and/or order binding.
pub async fn remove_parameters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveTaskParametersRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state
        .tasks
        .remove_parameters(room_id, req.task.id, req.task.description, req.task.order_id)?;
    Ok(Json(true))
}

/// POST /bot/task/list — every periodic task of the room, inactive included.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<TaskListResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let tasks = state
        .tasks
        .list(room_id, Utc::now())?
        .into_iter()
        .map(|t| TaskBriefInfo {
            id: t.id,
            name: t.name,
            inactive: t.inactive,
        })
        .collect();
    Ok(Json(TaskListResponse { tasks }))
}

/// POST /bot/task/info
pub async fn info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskInfoRequest>,
) -> Result<Json<TaskInfoResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let task = state.tasks.info(room_id, req.task.id)?;
    let inactive = task.is_inactive(Utc::now());
    Ok(Json(TaskInfoResponse {
        name: task.name,
        description: task.description,
        start_date: task.start_at,
        period: task.period,
        order_id: task.order_id,
        inactive,
    }))
}

/// POST /bot/task/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskIdRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state.tasks.delete(room_id, req.task_id)?;
    Ok(Json(true))
}
