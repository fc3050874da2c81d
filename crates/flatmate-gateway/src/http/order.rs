use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use flatmate_core::types::OrderId;
use flatmate_protocol::input::{CreateOrderRequest, OrderIdRequest, OrderInfoRequest};
use flatmate_protocol::output::OrderInfoResponse;

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/order/create — returns the new order's id. The user list is the
/// rotation sequence; an empty list is rejected before any write.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderId>, Reject> {
    if req.order.users.is_empty() {
        return Err(Reject::shape("order must have at least one executor"));
    }
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let id = state.orders.create_order(room_id, &req.order.users)?;
    Ok(Json(id))
}

/// POST /bot/order/info — executors in rotation sequence, one entry per slot.
pub async fn info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderInfoRequest>,
) -> Result<Json<OrderInfoResponse>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let sequence = state.orders.order_info(room_id, req.order.id)?;

    let mut ids: Vec<_> = sequence.clone();
    ids.sort_unstable();
    ids.dedup();
    let by_id: BTreeMap<_, _> = state
        .directory
        .users_by_ids(&ids)?
        .iter()
        .map(|u| (u.id, super::user_info(u)))
        .collect();

    // Slots keep their duplicates; a slot whose user vanished is dropped.
    let users = sequence
        .into_iter()
        .filter_map(|id| by_id.get(&id).cloned())
        .collect();
    Ok(Json(OrderInfoResponse { users }))
}

/// POST /bot/order/delete — unbinds every dependent task, then deletes.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderIdRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state.orders.delete_order(room_id, req.order_id)?;
    Ok(Json(true))
}

/// POST /bot/order/is_in_use — whether any task (either kind) is bound to it.
pub async fn is_in_use(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderIdRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let in_use = state.orders.is_in_use(room_id, req.order_id)?;
    Ok(Json(in_use))
}
