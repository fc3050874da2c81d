use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use flatmate_core::types::{InvitationId, RoomId, UserId};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use crate::db::{row_to_invitation, row_to_user};
use crate::error::{Result, RoomsError};
use crate::types::{IncomingInvitation, Invitation, SentInvitation};

/// Manages the invitation lifecycle: create, inbox/sent listings with lazy
/// expiry, accept/reject/delete.
///
/// Ownership rules are strict: accept and reject require the caller's alias
/// to match the addressee (case-insensitive); delete requires the caller to
/// be the sender.
pub struct InvitationManager {
    db: Arc<Mutex<Connection>>,
    /// Pending-invitation cap per sender.
    max_pending: u32,
    lifespan: Duration,
}

impl InvitationManager {
    pub fn new(db: Arc<Mutex<Connection>>, max_pending: u32, lifespan_days: i64) -> Self {
        Self {
            db,
            max_pending,
            lifespan: Duration::days(lifespan_days),
        }
    }

    /// Invite `addressee_alias` to the sender's room.
    ///
    /// The addressee does not have to exist yet — the alias may be claimed
    /// after the invitation is sent.
    #[instrument(skip(self, now))]
    pub fn invite(
        &self,
        sender_id: UserId,
        addressee_alias: &str,
        now: DateTime<Utc>,
    ) -> Result<InvitationId> {
        let db = self.db.lock().unwrap();
        let sender = require_user(&db, sender_id)?;
        let room_id = sender
            .room_id
            .ok_or(RoomsError::UserWithoutRoom(sender_id))?;

        let pending: i64 = db.query_row(
            "SELECT COUNT(*) FROM invitations WHERE sender_id = ?1",
            rusqlite::params![sender_id],
            |row| row.get(0),
        )?;
        if pending >= self.max_pending as i64 {
            return Err(RoomsError::TooManyInvitations(sender_id));
        }

        let duplicate: bool = db.query_row(
            "SELECT EXISTS(SELECT 1 FROM invitations
             WHERE sender_id = ?1 AND addressee_alias = ?2 COLLATE NOCASE)",
            rusqlite::params![sender_id, addressee_alias],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(RoomsError::InvitationAlreadySent);
        }

        let expires_at = now + self.lifespan;
        db.execute(
            "INSERT INTO invitations (sender_id, addressee_alias, room_id, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![sender_id, addressee_alias, room_id, expires_at.to_rfc3339()],
        )?;
        let id = db.last_insert_rowid();
        info!(sender_id, room_id, invitation_id = id, "invitation sent");
        Ok(id)
    }

    /// Invitations addressed to the user's alias. Expired rows are deleted
    /// on the way through; a user without an alias has an empty inbox.
    pub fn inbox(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<IncomingInvitation>> {
        let db = self.db.lock().unwrap();
        let user = require_user(&db, user_id)?;
        let Some(alias) = user.alias else {
            return Ok(Vec::new());
        };

        let rows = {
            let mut stmt = db.prepare(
                "SELECT id, sender_id, addressee_alias, room_id, expires_at
                 FROM invitations WHERE addressee_alias = ?1 COLLATE NOCASE
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![alias], row_to_invitation)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut invitations = Vec::new();
        for inv in rows {
            if inv.expires_at <= now {
                delete_row(&db, inv.id)?;
                continue;
            }
            let sender = require_user(&db, inv.sender_id)?;
            let room_name = room_name(&db, inv.room_id)?;
            invitations.push(IncomingInvitation {
                id: inv.id,
                sender,
                room_id: inv.room_id,
                room_name,
            });
        }
        Ok(invitations)
    }

    /// Invitations sent by the user, with the same lazy expiry as `inbox`.
    pub fn sent(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<SentInvitation>> {
        let db = self.db.lock().unwrap();
        require_user(&db, user_id)?;

        let rows = {
            let mut stmt = db.prepare(
                "SELECT id, sender_id, addressee_alias, room_id, expires_at
                 FROM invitations WHERE sender_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id], row_to_invitation)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut invitations = Vec::new();
        for inv in rows {
            if inv.expires_at <= now {
                delete_row(&db, inv.id)?;
                continue;
            }
            let room_name = room_name(&db, inv.room_id)?;
            invitations.push(SentInvitation {
                id: inv.id,
                addressee: inv.addressee_alias,
                room_id: inv.room_id,
                room_name,
            });
        }
        Ok(invitations)
    }

    /// Accept an invitation, joining its room. The caller must be roomless
    /// and the invitation must be addressed to the caller's alias.
    #[instrument(skip(self, now))]
    pub fn accept(
        &self,
        user_id: UserId,
        invitation_id: InvitationId,
        now: DateTime<Utc>,
    ) -> Result<RoomId> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let user = require_user(&tx, user_id)?;
        if user.room_id.is_some() {
            return Err(RoomsError::UserHasRoom(user_id));
        }

        let inv = require_invitation(&tx, invitation_id)?;
        if inv.expires_at <= now {
            tx.execute(
                "DELETE FROM invitations WHERE id = ?1",
                rusqlite::params![invitation_id],
            )?;
            tx.commit()?;
            debug!(invitation_id, "expired invitation removed on accept");
            return Err(RoomsError::InvitationExpired(invitation_id));
        }
        check_addressee(&user.alias, &inv.addressee_alias)?;

        tx.execute(
            "UPDATE users SET room_id = ?1 WHERE id = ?2",
            rusqlite::params![inv.room_id, user_id],
        )?;
        tx.execute(
            "DELETE FROM invitations WHERE id = ?1",
            rusqlite::params![invitation_id],
        )?;
        tx.commit()?;
        info!(user_id, room_id = inv.room_id, "invitation accepted");
        Ok(inv.room_id)
    }

    /// Reject an invitation addressed to the caller.
    #[instrument(skip(self))]
    pub fn reject(&self, user_id: UserId, invitation_id: InvitationId) -> Result<()> {
        let db = self.db.lock().unwrap();
        let user = require_user(&db, user_id)?;
        let inv = require_invitation(&db, invitation_id)?;
        check_addressee(&user.alias, &inv.addressee_alias)?;
        delete_row(&db, invitation_id)?;
        Ok(())
    }

    /// Withdraw a sent invitation. Only the sender may do this.
    #[instrument(skip(self))]
    pub fn delete(&self, user_id: UserId, invitation_id: InvitationId) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_user(&db, user_id)?;
        let inv = require_invitation(&db, invitation_id)?;
        if inv.sender_id != user_id {
            return Err(RoomsError::NotSender);
        }
        delete_row(&db, invitation_id)?;
        Ok(())
    }
}

/// Alias-ownership invariant: the caller must hold the addressed alias.
fn check_addressee(alias: &Option<String>, addressee: &str) -> Result<()> {
    match alias {
        Some(a) if a.eq_ignore_ascii_case(addressee) => Ok(()),
        _ => Err(RoomsError::NotAddressee),
    }
}

fn require_user(conn: &Connection, user_id: UserId) -> Result<crate::types::User> {
    match conn.query_row(
        "SELECT id, alias, fullname, room_id, registered_at FROM users WHERE id = ?1",
        rusqlite::params![user_id],
        row_to_user,
    ) {
        Ok(u) => Ok(u),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RoomsError::UserNotExist(user_id)),
        Err(e) => Err(RoomsError::Database(e)),
    }
}

fn require_invitation(conn: &Connection, id: InvitationId) -> Result<Invitation> {
    match conn.query_row(
        "SELECT id, sender_id, addressee_alias, room_id, expires_at
         FROM invitations WHERE id = ?1",
        rusqlite::params![id],
        row_to_invitation,
    ) {
        Ok(i) => Ok(i),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RoomsError::InvitationNotExist(id)),
        Err(e) => Err(RoomsError::Database(e)),
    }
}

fn room_name(conn: &Connection, room_id: RoomId) -> Result<String> {
    match conn.query_row(
        "SELECT name FROM rooms WHERE id = ?1",
        rusqlite::params![room_id],
        |row| row.get(0),
    ) {
        Ok(name) => Ok(name),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RoomsError::RoomNotExist),
        Err(e) => Err(RoomsError::Database(e)),
    }
}

fn delete_row(conn: &Connection, id: InvitationId) -> Result<()> {
    conn.execute("DELETE FROM invitations WHERE id = ?1", rusqlite::params![id])?;
    Ok(())
}
