use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use flatmate_core::types::RoomId;
use flatmate_protocol::input::{CreateRoomRequest, UserOnlyRequest};
use flatmate_protocol::output::{
    DailyInfoResponse, ListOfOrdersResponse, RoomInfoResponse, TaskDailyInfo,
};

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/room/create — returns the new room's id.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<RoomId>, Reject> {
    super::check_name(&req.room.name)?;
    let id = state.directory.create_room(req.user_id, &req.room.name)?;
    Ok(Json(id))
}

/// POST /bot/room/info
pub async fn info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<RoomInfoResponse>, Reject> {
    let (room, members) = state.directory.room_info(req.user_id)?;
    Ok(Json(RoomInfoResponse {
        id: room.id,
        name: room.name,
        users: members.iter().map(super::user_info).collect(),
    }))
}

/// POST /bot/room/daily_info — today's duty digest.
///
/// Periodic tasks appear only on their duty day; manual tasks appear
/// whenever they are bound. `user_info` carries details for every
/// referenced user id.
pub async fn daily_info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<DailyInfoResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let now = Utc::now();

    let periodic = state.tasks.daily_duties(room_id, now)?;
    let manual = state.manual.current_duties(room_id)?;

    let ids: BTreeSet<_> = periodic
        .iter()
        .chain(manual.iter())
        .map(|d| d.user_id)
        .collect();
    let ids: Vec<_> = ids.into_iter().collect();
    let user_info = state
        .directory
        .users_by_ids(&ids)?
        .iter()
        .map(|u| (u.id, super::user_info(u)))
        .collect();

    let to_wire = |d: flatmate_rota::DutyLine| TaskDailyInfo {
        id: d.task_id,
        name: d.name,
        today_executor: d.user_id,
    };
    Ok(Json(DailyInfoResponse {
        periodic_tasks: periodic.into_iter().map(to_wire).collect(),
        manual_tasks: manual.into_iter().map(to_wire).collect(),
        user_info,
    }))
}

/// POST /bot/room/leave
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<bool>, Reject> {
    state.directory.leave_room(req.user_id)?;
    Ok(Json(true))
}

/// POST /bot/room/list_of_orders — every order of the room with its
/// rotation sequence, plus details of the referenced users.
pub async fn list_of_orders(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<ListOfOrdersResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let orders = state.orders.list_for_room(room_id)?;

    let mut user_ids = BTreeSet::new();
    let mut order_map = BTreeMap::new();
    for (order_id, users) in orders {
        user_ids.extend(users.iter().copied());
        order_map.insert(order_id, users);
    }
    let ids: Vec<_> = user_ids.into_iter().collect();
    let users = state
        .directory
        .users_by_ids(&ids)?
        .iter()
        .map(super::user_info)
        .collect();

    Ok(Json(ListOfOrdersResponse {
        users,
        orders: order_map,
    }))
}
