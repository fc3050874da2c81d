use std::sync::{Arc, Mutex};

use chrono::Utc;
use flatmate_core::types::{RoomId, UserId};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use crate::db::row_to_user;
use crate::error::{Result, RoomsError};
use crate::types::{Room, User};

const USER_SELECT_SQL: &str = "SELECT id, alias, fullname, room_id, registered_at FROM users";

/// Registry of users, rooms, and membership.
///
/// Wraps the shared SQLite connection in a `Mutex`; every public method runs
/// its statements under the lock, so multi-statement mutations are never
/// interleaved with other requests.
pub struct RoomDirectory {
    db: Arc<Mutex<Connection>>,
}

impl RoomDirectory {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Register a new user under their platform id.
    #[instrument(skip(self))]
    pub fn create_user(&self, user_id: UserId) -> Result<UserId> {
        let db = self.db.lock().unwrap();
        if user_row(&db, user_id)?.is_some() {
            return Err(RoomsError::UserExists(user_id));
        }
        db.execute(
            "INSERT INTO users (id, registered_at) VALUES (?1, ?2)",
            rusqlite::params![user_id, Utc::now().to_rfc3339()],
        )?;
        info!(user_id, "user registered");
        Ok(user_id)
    }

    /// Set or clear a user's alias.
    ///
    /// Pending invitations addressed to the previous alias follow the user:
    /// they are re-addressed to the new alias, or deleted when the alias is
    /// cleared.
    #[instrument(skip(self))]
    pub fn save_alias(&self, user_id: UserId, alias: Option<&str>) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let user = user_row(&tx, user_id)?.ok_or(RoomsError::UserNotExist(user_id))?;
        if let Some(alias) = alias {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE alias = ?1 COLLATE NOCASE AND id != ?2)",
                rusqlite::params![alias, user_id],
                |row| row.get(0),
            )?;
            if taken {
                return Err(RoomsError::AliasTaken(alias.to_string()));
            }
        }

        if let Some(old) = user.alias {
            match alias {
                Some(new) => {
                    let n = tx.execute(
                        "UPDATE invitations SET addressee_alias = ?1
                         WHERE addressee_alias = ?2 COLLATE NOCASE",
                        rusqlite::params![new, old],
                    )?;
                    debug!(user_id, readdressed = n, "alias changed");
                }
                None => {
                    tx.execute(
                        "DELETE FROM invitations WHERE addressee_alias = ?1 COLLATE NOCASE",
                        rusqlite::params![old],
                    )?;
                }
            }
        }

        tx.execute(
            "UPDATE users SET alias = ?1 WHERE id = ?2",
            rusqlite::params![alias, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    #[instrument(skip(self, fullname))]
    pub fn save_fullname(&self, user_id: UserId, fullname: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE users SET fullname = ?1 WHERE id = ?2",
            rusqlite::params![fullname, user_id],
        )?;
        if n == 0 {
            return Err(RoomsError::UserNotExist(user_id));
        }
        Ok(())
    }

    /// Fetch a user, failing if they are not registered.
    pub fn user(&self, user_id: UserId) -> Result<User> {
        let db = self.db.lock().unwrap();
        user_row(&db, user_id)?.ok_or(RoomsError::UserNotExist(user_id))
    }

    /// Fetch a user and require room membership. Most bot operations are
    /// room-scoped and start here.
    pub fn user_in_room(&self, user_id: UserId) -> Result<(User, RoomId)> {
        let user = self.user(user_id)?;
        let room_id = user.room_id.ok_or(RoomsError::UserWithoutRoom(user_id))?;
        Ok((user, room_id))
    }

    /// Create a room and join the (roomless) creator to it.
    #[instrument(skip(self, name))]
    pub fn create_room(&self, user_id: UserId, name: &str) -> Result<RoomId> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let user = user_row(&tx, user_id)?.ok_or(RoomsError::UserNotExist(user_id))?;
        if user.room_id.is_some() {
            return Err(RoomsError::UserHasRoom(user_id));
        }

        tx.execute("INSERT INTO rooms (name) VALUES (?1)", rusqlite::params![name])?;
        let room_id: RoomId = tx.last_insert_rowid();
        tx.execute(
            "UPDATE users SET room_id = ?1 WHERE id = ?2",
            rusqlite::params![room_id, user_id],
        )?;
        tx.commit()?;
        info!(user_id, room_id, "room created");
        Ok(room_id)
    }

    pub fn room(&self, room_id: RoomId) -> Result<Room> {
        let db = self.db.lock().unwrap();
        room_row(&db, room_id)?.ok_or(RoomsError::RoomNotExist)
    }

    /// The acting user's room plus its member list.
    pub fn room_info(&self, user_id: UserId) -> Result<(Room, Vec<User>)> {
        let (_, room_id) = self.user_in_room(user_id)?;
        let db = self.db.lock().unwrap();
        let room = room_row(&db, room_id)?.ok_or(RoomsError::RoomNotExist)?;
        let mut stmt =
            db.prepare(&format!("{USER_SELECT_SQL} WHERE room_id = ?1 ORDER BY id"))?;
        let members = stmt
            .query_map(rusqlite::params![room_id], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((room, members))
    }

    /// Leave the current room, dropping the user's sent invitations. When the
    /// leaver was the last member the room itself is deleted, cascading to
    /// orders, tasks, rules, and invitations.
    ///
    /// Membership is resolved inside the transaction, so the roommate count
    /// and the mutation see the same state.
    #[instrument(skip(self))]
    pub fn leave_room(&self, user_id: UserId) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let user = user_row(&tx, user_id)?.ok_or(RoomsError::UserNotExist(user_id))?;
        let room_id = user.room_id.ok_or(RoomsError::UserWithoutRoom(user_id))?;

        let roommates: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE room_id = ?1",
            rusqlite::params![room_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "UPDATE users SET room_id = NULL WHERE id = ?1",
            rusqlite::params![user_id],
        )?;
        tx.execute(
            "DELETE FROM invitations WHERE sender_id = ?1",
            rusqlite::params![user_id],
        )?;
        if roommates == 1 {
            tx.execute("DELETE FROM rooms WHERE id = ?1", rusqlite::params![room_id])?;
            info!(room_id, "last member left, room deleted");
        }
        tx.commit()?;
        Ok(())
    }

    /// Bulk detail lookup for response composition (e.g. the daily digest's
    /// `user_info` map).
    pub fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let db = self.db.lock().unwrap();
        let mut users = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(user) = user_row(&db, id)? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

fn user_row(conn: &Connection, user_id: UserId) -> Result<Option<User>> {
    match conn.query_row(
        &format!("{USER_SELECT_SQL} WHERE id = ?1"),
        rusqlite::params![user_id],
        row_to_user,
    ) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(RoomsError::Database(e)),
    }
}

fn room_row(conn: &Connection, room_id: RoomId) -> Result<Option<Room>> {
    match conn.query_row(
        "SELECT id, name FROM rooms WHERE id = ?1",
        rusqlite::params![room_id],
        |row| {
            Ok(Room {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    ) {
        Ok(r) => Ok(Some(r)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(RoomsError::Database(e)),
    }
}
