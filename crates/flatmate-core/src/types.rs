//! Identifier aliases shared across the subsystem crates.
//!
//! Users carry the numeric id of the external chat platform; every other
//! entity uses its SQLite rowid. Plain aliases keep rusqlite parameter
//! binding direct.

pub type UserId = i64;
pub type RoomId = i64;
pub type OrderId = i64;
pub type TaskId = i64;
pub type InvitationId = i64;
pub type RuleId = i64;
