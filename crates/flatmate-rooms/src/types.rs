use chrono::{DateTime, Utc};
use flatmate_core::types::{InvitationId, RoomId, RuleId, UserId};
use serde::{Deserialize, Serialize};

/// A registered user. `id` is the external platform id supplied at
/// registration — never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique case-insensitively; invitations are addressed to it.
    pub alias: Option<String>,
    pub fullname: Option<String>,
    pub room_id: Option<RoomId>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

/// A pending room invitation. The addressee is matched by alias, so it may
/// be sent before the addressee has even registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub sender_id: UserId,
    pub addressee_alias: String,
    pub room_id: RoomId,
    pub expires_at: DateTime<Utc>,
}

/// Inbox view of an invitation, joined with sender and room details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingInvitation {
    pub id: InvitationId,
    pub sender: User,
    pub room_id: RoomId,
    pub room_name: String,
}

/// Sender's view of a pending invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInvitation {
    pub id: InvitationId,
    pub addressee: String,
    pub room_id: RoomId,
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub room_id: RoomId,
    pub name: String,
    pub text: String,
}
