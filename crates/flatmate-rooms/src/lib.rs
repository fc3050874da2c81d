//! `flatmate-rooms` — the registry subsystem: users, rooms, membership,
//! invitations, and house rules.
//!
//! Everything here is a precondition layer for the rotation core in
//! `flatmate-rota`: a user must be registered and belong to a room before
//! they can appear in a duty order. Managers share one SQLite connection
//! behind a mutex; multi-statement mutations run inside a transaction.

pub mod db;
pub mod directory;
pub mod error;
pub mod invitations;
pub mod rules;
pub mod types;

pub use directory::RoomDirectory;
pub use error::{Result, RoomsError};
pub use invitations::InvitationManager;
pub use rules::RuleBook;
pub use types::{IncomingInvitation, Invitation, Room, Rule, SentInvitation, User};
