use std::sync::{Arc, Mutex};

use flatmate_core::types::{RoomId, RuleId};
use rusqlite::Connection;
use tracing::instrument;

use crate::db::row_to_rule;
use crate::error::{Result, RoomsError};
use crate::types::Rule;

/// Room-scoped CRUD for house rules. No rotation logic; shares the
/// ownership pattern of the task managers.
pub struct RuleBook {
    db: Arc<Mutex<Connection>>,
}

impl RuleBook {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, name, text))]
    pub fn create_rule(&self, room_id: RoomId, name: &str, text: &str) -> Result<RuleId> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO rules (room_id, name, text) VALUES (?1, ?2, ?3)",
            rusqlite::params![room_id, name, text],
        )?;
        Ok(db.last_insert_rowid())
    }

    pub fn list_rules(&self, room_id: RoomId) -> Result<Vec<Rule>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, room_id, name, text FROM rules WHERE room_id = ?1 ORDER BY id",
        )?;
        let rules = stmt
            .query_map(rusqlite::params![room_id], row_to_rule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }

    /// Patch semantics: absent fields keep their prior values.
    #[instrument(skip(self, name, text))]
    pub fn edit_rule(
        &self,
        room_id: RoomId,
        rule_id: RuleId,
        name: Option<&str>,
        text: Option<&str>,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_rule(&db, room_id, rule_id)?;
        if let Some(name) = name {
            db.execute(
                "UPDATE rules SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, rule_id],
            )?;
        }
        if let Some(text) = text {
            db.execute(
                "UPDATE rules SET text = ?1 WHERE id = ?2",
                rusqlite::params![text, rule_id],
            )?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_rule(&self, room_id: RoomId, rule_id: RuleId) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_rule(&db, room_id, rule_id)?;
        db.execute("DELETE FROM rules WHERE id = ?1", rusqlite::params![rule_id])?;
        Ok(())
    }
}

/// A rule in another room is indistinguishable from a missing one — the
/// caller must not learn which.
fn require_rule(conn: &Connection, room_id: RoomId, rule_id: RuleId) -> Result<Rule> {
    match conn.query_row(
        "SELECT id, room_id, name, text FROM rules WHERE id = ?1",
        rusqlite::params![rule_id],
        row_to_rule,
    ) {
        Ok(rule) if rule.room_id == room_id => Ok(rule),
        Ok(_) | Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(RoomsError::WrongRoom { entity: "rule" })
        }
        Err(e) => Err(RoomsError::Database(e)),
    }
}
