use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};

use crate::types::{Invitation, Rule, User};

/// Initialise all tables for the registry subsystem. Safe to call on every
/// startup — CREATE IF NOT EXISTS means it's idempotent.
///
/// Must run before `flatmate_rota::db::init_db`: the rota tables declare
/// foreign keys into `users` and `rooms`.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS rooms (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY,
            alias         TEXT UNIQUE COLLATE NOCASE,
            fullname      TEXT,
            room_id       INTEGER REFERENCES rooms(id)
                              ON UPDATE CASCADE ON DELETE SET NULL,
            registered_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_room ON users (room_id);

        CREATE TABLE IF NOT EXISTS invitations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id       INTEGER NOT NULL REFERENCES users(id)
                                ON UPDATE CASCADE ON DELETE CASCADE,
            addressee_alias TEXT NOT NULL COLLATE NOCASE,
            room_id         INTEGER NOT NULL REFERENCES rooms(id)
                                ON UPDATE CASCADE ON DELETE CASCADE,
            expires_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_invitations_sender
            ON invitations (sender_id);
        CREATE INDEX IF NOT EXISTS idx_invitations_addressee
            ON invitations (addressee_alias);

        CREATE TABLE IF NOT EXISTS rules (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id INTEGER NOT NULL REFERENCES rooms(id)
                        ON UPDATE CASCADE ON DELETE CASCADE,
            name    TEXT NOT NULL,
            text    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rules_room ON rules (room_id);",
    )
}

/// Map a SELECT row (column order: id, alias, fullname, room_id,
/// registered_at) to a User. Centralised so every query in this crate stays
/// consistent.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        alias: row.get(1)?,
        fullname: row.get(2)?,
        room_id: row.get(3)?,
        registered_at: parse_ts(row, 4)?,
    })
}

/// Column order: id, sender_id, addressee_alias, room_id, expires_at.
pub(crate) fn row_to_invitation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Invitation> {
    Ok(Invitation {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        addressee_alias: row.get(2)?,
        room_id: row.get(3)?,
        expires_at: parse_ts(row, 4)?,
    })
}

/// Column order: id, room_id, name, text.
pub(crate) fn row_to_rule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Rule> {
    Ok(Rule {
        id: row.get(0)?,
        room_id: row.get(1)?,
        name: row.get(2)?,
        text: row.get(3)?,
    })
}

/// Parse an RFC 3339 TEXT column into a UTC instant.
pub(crate) fn parse_ts(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
