use flatmate_core::types::{InvitationId, UserId};
use thiserror::Error;

/// All registry-layer errors. Kept separate from the rota errors so the
/// gateway can map each subsystem to wire codes without coupling layers.
#[derive(Debug, Error)]
pub enum RoomsError {
    #[error("user {0} already exists")]
    UserExists(UserId),

    #[error("user {0} does not exist")]
    UserNotExist(UserId),

    /// The alias is already claimed by another user (case-insensitive).
    #[error("alias {0:?} is already taken")]
    AliasTaken(String),

    #[error("room does not exist")]
    RoomNotExist,

    #[error("user {0} does not have a room")]
    UserWithoutRoom(UserId),

    #[error("user {0} already has a room")]
    UserHasRoom(UserId),

    #[error("maximum number of pending invitations reached for user {0}")]
    TooManyInvitations(UserId),

    #[error("such an invitation is already sent")]
    InvitationAlreadySent,

    #[error("invitation {0} is not found")]
    InvitationNotExist(InvitationId),

    #[error("invitation {0} has expired")]
    InvitationExpired(InvitationId),

    /// Accept/reject by someone whose alias does not match the addressee.
    #[error("the invitation is not addressed to this user")]
    NotAddressee,

    /// Delete by someone other than the sender.
    #[error("the invitation was not sent by this user")]
    NotSender,

    /// Entity exists in a different room (or not at all) — the caller must
    /// not learn which.
    #[error("the {entity} does not belong to the room")]
    WrongRoom { entity: &'static str },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RoomsError>;
