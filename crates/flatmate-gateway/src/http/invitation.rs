use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use flatmate_core::types::{InvitationId, RoomId};
use flatmate_protocol::input::{InvitationActionRequest, InviteRequest, UserOnlyRequest};
use flatmate_protocol::output::{
    IncomingInvitationInfo, IncomingInvitationsResponse, SentInvitationInfo,
    SentInvitationsResponse,
};

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/invitation/create — invite an alias into the sender's room.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InviteRequest>,
) -> Result<Json<InvitationId>, Reject> {
    super::check_name(&req.addressee.alias)?;
    let id = state
        .invitations
        .invite(req.user_id, &req.addressee.alias, Utc::now())?;
    Ok(Json(id))
}

/// POST /bot/invitation/inbox — pending invitations addressed to the caller.
pub async fn inbox(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<IncomingInvitationsResponse>, Reject> {
    let invitations = state
        .invitations
        .inbox(req.user_id, Utc::now())?
        .into_iter()
        .map(|inv| IncomingInvitationInfo {
            id: inv.id,
            sender: super::user_info(&inv.sender),
            room: inv.room_id,
            room_name: inv.room_name,
        })
        .collect();
    Ok(Json(IncomingInvitationsResponse { invitations }))
}

/// POST /bot/invitation/sent — pending invitations sent by the caller.
pub async fn sent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<SentInvitationsResponse>, Reject> {
    let invitations = state
        .invitations
        .sent(req.user_id, Utc::now())?
        .into_iter()
        .map(|inv| SentInvitationInfo {
            id: inv.id,
            addressee: inv.addressee,
            room: inv.room_id,
            room_name: inv.room_name,
        })
        .collect();
    Ok(Json(SentInvitationsResponse { invitations }))
}

/// POST /bot/invitation/accept — join the inviting room; returns its id.
pub async fn accept(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvitationActionRequest>,
) -> Result<Json<RoomId>, Reject> {
    let room_id = state
        .invitations
        .accept(req.user_id, req.invitation.id, Utc::now())?;
    Ok(Json(room_id))
}

/// POST /bot/invitation/reject
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvitationActionRequest>,
) -> Result<Json<bool>, Reject> {
    state.invitations.reject(req.user_id, req.invitation.id)?;
    Ok(Json(true))
}

/// POST /bot/invitation/delete — sender withdraws a pending invitation.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvitationActionRequest>,
) -> Result<Json<bool>, Reject> {
    state.invitations.delete(req.user_id, req.invitation.id)?;
    Ok(Json(true))
}
