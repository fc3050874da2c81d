//! One handler module per bot API group. Handlers do shape validation,
//! resolve the acting user's room, call the managers, and shape the
//! response payloads.

pub mod health;
pub mod invitation;
pub mod manual_task;
pub mod order;
pub mod room;
pub mod rule;
pub mod task;
pub mod user;

use flatmate_protocol::output::UserInfo;
use flatmate_rooms::User;

use crate::reject::Reject;

pub(crate) const MAX_NAME: usize = 100;
pub(crate) const MAX_DESCRIPTION_CREATE: usize = 1000;
pub(crate) const MAX_DESCRIPTION_MODIFY: usize = 3000;

/// Names are required and bounded on every create/modify body.
pub(crate) fn check_name(name: &str) -> Result<(), Reject> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME {
        return Err(Reject::shape(format!(
            "name must be between 1 and {MAX_NAME} characters"
        )));
    }
    Ok(())
}

pub(crate) fn check_description(description: Option<&str>, max: usize) -> Result<(), Reject> {
    if let Some(description) = description {
        if description.chars().count() > max {
            return Err(Reject::shape(format!(
                "description must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_period(period: i64) -> Result<(), Reject> {
    if period < 1 {
        return Err(Reject::shape("period must be at least 1 day"));
    }
    Ok(())
}

pub(crate) fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        alias: user.alias.clone(),
        fullname: user.fullname.clone(),
    }
}
