use std::sync::Arc;

use axum::{extract::State, Json};
use flatmate_core::types::RuleId;
use flatmate_protocol::input::{
    CreateRuleRequest, EditRuleRequest, RuleIdRequest, UserOnlyRequest,
};
use flatmate_protocol::output::RuleInfo;

use crate::app::AppState;
use crate::reject::Reject;

/// POST /bot/rule/create — returns the new rule's id.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<RuleId>, Reject> {
    super::check_name(&req.rule.name)?;
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let id = state.rules.create_rule(room_id, &req.rule.name, &req.rule.text)?;
    Ok(Json(id))
}

/// POST /bot/rule/list — every rule of the room, in id order.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserOnlyRequest>,
) -> Result<Json<Vec<RuleInfo>>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    let rules = state
        .rules
        .list_rules(room_id)?
        .into_iter()
        .map(|r| RuleInfo {
            id: r.id,
            name: r.name,
            text: r.text,
        })
        .collect();
    Ok(Json(rules))
}

/// POST /bot/rule/edit — partial update of name and/or text.
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditRuleRequest>,
) -> Result<Json<bool>, Reject> {
    if let Some(ref name) = req.rule.name {
        super::check_name(name)?;
    }
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state.rules.edit_rule(
        room_id,
        req.rule.id,
        req.rule.name.as_deref(),
        req.rule.text.as_deref(),
    )?;
    Ok(Json(true))
}

/// POST /bot/rule/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RuleIdRequest>,
) -> Result<Json<bool>, Reject> {
    let (_, room_id) = state.directory.user_in_room(req.user_id)?;
    state.rules.delete_rule(room_id, req.rule_id)?;
    Ok(Json(true))
}
