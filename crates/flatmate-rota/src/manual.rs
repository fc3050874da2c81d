use std::sync::{Arc, Mutex};

use flatmate_core::types::{OrderId, RoomId, TaskId, UserId};
use rusqlite::Connection;
use tracing::{error, info, instrument};

use crate::db::{row_to_manual_task, MANUAL_SELECT_SQL};
use crate::error::{Result, RotaError};
use crate::orders::{count_executors, executor_at, require_order};
use crate::types::{DutyLine, ManualTask, ManualTaskPatch, TaskBrief};

/// Manager for manual tasks: duty advances only through explicit `perform`
/// calls, tracked by the persisted counter.
///
/// The counter is only meaningful relative to one order's positions, so any
/// change of the binding resets it to 0.
pub struct ManualTaskManager {
    db: Arc<Mutex<Connection>>,
    /// Manual tasks per room.
    max_tasks: u32,
}

impl ManualTaskManager {
    pub fn new(db: Arc<Mutex<Connection>>, max_tasks: u32) -> Self {
        Self { db, max_tasks }
    }

    #[instrument(skip(self, name, description))]
    pub fn create(
        &self,
        room_id: RoomId,
        name: &str,
        description: Option<&str>,
        order_id: Option<OrderId>,
    ) -> Result<TaskId> {
        let db = self.db.lock().unwrap();
        let existing: i64 = db.query_row(
            "SELECT COUNT(*) FROM manual_tasks WHERE room_id = ?1",
            rusqlite::params![room_id],
            |row| row.get(0),
        )?;
        if existing >= self.max_tasks as i64 {
            return Err(RotaError::TooManyTasks);
        }
        if let Some(order_id) = order_id {
            require_order(&db, room_id, order_id)?;
        }

        db.execute(
            "INSERT INTO manual_tasks (room_id, name, description, counter, order_id)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![room_id, name, description, order_id],
        )?;
        let id = db.last_insert_rowid();
        info!(room_id, task_id = id, "manual task created");
        Ok(id)
    }

    /// Apply a partial update. Supplying `order_id` re-validates the binding
    /// and resets the counter, even when rebinding to the same order.
    #[instrument(skip(self, patch))]
    pub fn modify(&self, room_id: RoomId, task_id: TaskId, patch: &ManualTaskPatch) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        require_manual_task(&tx, room_id, task_id)?;

        if let Some(ref name) = patch.name {
            tx.execute(
                "UPDATE manual_tasks SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, task_id],
            )?;
        }
        if let Some(ref description) = patch.description {
            tx.execute(
                "UPDATE manual_tasks SET description = ?1 WHERE id = ?2",
                rusqlite::params![description, task_id],
            )?;
        }
        if let Some(order_id) = patch.order_id {
            require_order(&tx, room_id, order_id)?;
            tx.execute(
                "UPDATE manual_tasks SET order_id = ?1, counter = 0 WHERE id = ?2",
                rusqlite::params![order_id, task_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Clear optional fields. Unbinding the order also resets the counter.
    #[instrument(skip(self))]
    pub fn remove_parameters(
        &self,
        room_id: RoomId,
        task_id: TaskId,
        description: bool,
        order_id: bool,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_manual_task(&db, room_id, task_id)?;
        if description {
            db.execute(
                "UPDATE manual_tasks SET description = NULL WHERE id = ?1",
                rusqlite::params![task_id],
            )?;
        }
        if order_id {
            db.execute(
                "UPDATE manual_tasks SET order_id = NULL, counter = 0 WHERE id = ?1",
                rusqlite::params![task_id],
            )?;
        }
        Ok(())
    }

    pub fn list(&self, room_id: RoomId) -> Result<Vec<TaskBrief>> {
        let db = self.db.lock().unwrap();
        let tasks = room_manual_tasks(&db, room_id)?;
        Ok(tasks
            .into_iter()
            .map(|t| TaskBrief {
                id: t.id,
                name: t.name.clone(),
                inactive: t.is_inactive(),
            })
            .collect())
    }

    pub fn info(&self, room_id: RoomId, task_id: TaskId) -> Result<ManualTask> {
        let db = self.db.lock().unwrap();
        require_manual_task(&db, room_id, task_id)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, room_id: RoomId, task_id: TaskId) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_manual_task(&db, room_id, task_id)?;
        db.execute(
            "DELETE FROM manual_tasks WHERE id = ?1",
            rusqlite::params![task_id],
        )?;
        Ok(())
    }

    /// Advance the rotation one step: `counter = (counter + 1) mod n`.
    ///
    /// The increment is a single UPDATE under the connection lock, so
    /// concurrent performs serialize instead of both reading the same
    /// pre-increment value. Returns the new counter.
    #[instrument(skip(self))]
    pub fn perform(&self, room_id: RoomId, task_id: TaskId) -> Result<i64> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        let task = require_manual_task(&tx, room_id, task_id)?;
        let Some(order_id) = task.order_id else {
            return Err(RotaError::Inactive(task_id));
        };

        let count = count_executors(&tx, order_id)?;
        if count == 0 {
            error!(task_id, order_id, "bound order has no executors");
            return Err(RotaError::EmptyOrder);
        }
        tx.execute(
            "UPDATE manual_tasks SET counter = (counter + 1) % ?1 WHERE id = ?2",
            rusqlite::params![count, task_id],
        )?;
        let counter: i64 = tx.query_row(
            "SELECT counter FROM manual_tasks WHERE id = ?1",
            rusqlite::params![task_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        info!(task_id, counter, "manual task performed");
        Ok(counter)
    }

    /// Who currently holds the duty: the executor at (order, counter).
    pub fn current_executor(&self, room_id: RoomId, task_id: TaskId) -> Result<(i64, UserId)> {
        let db = self.db.lock().unwrap();
        let task = require_manual_task(&db, room_id, task_id)?;
        let Some(order_id) = task.order_id else {
            return Err(RotaError::Inactive(task_id));
        };
        let user_id = executor_at(&db, order_id, task.counter).inspect_err(|e| {
            if e.is_consistency() {
                error!(task_id, order_id, position = task.counter, "dense-range invariant breach");
            }
        })?;
        Ok((task.counter, user_id))
    }

    /// All active manual tasks of the room with their current executors,
    /// for the daily digest.
    pub fn current_duties(&self, room_id: RoomId) -> Result<Vec<DutyLine>> {
        let db = self.db.lock().unwrap();
        let mut duties = Vec::new();
        for task in room_manual_tasks(&db, room_id)? {
            let Some(order_id) = task.order_id else {
                continue;
            };
            let user_id = executor_at(&db, order_id, task.counter)?;
            duties.push(DutyLine {
                task_id: task.id,
                name: task.name,
                user_id,
            });
        }
        Ok(duties)
    }
}

fn room_manual_tasks(conn: &Connection, room_id: RoomId) -> Result<Vec<ManualTask>> {
    let mut stmt =
        conn.prepare(&format!("{MANUAL_SELECT_SQL} WHERE room_id = ?1 ORDER BY id"))?;
    let tasks = stmt
        .query_map(rusqlite::params![room_id], row_to_manual_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

fn require_manual_task(conn: &Connection, room_id: RoomId, task_id: TaskId) -> Result<ManualTask> {
    match conn.query_row(
        &format!("{MANUAL_SELECT_SQL} WHERE id = ?1"),
        rusqlite::params![task_id],
        row_to_manual_task,
    ) {
        Ok(task) if task.room_id == room_id => Ok(task),
        Ok(_) => Err(RotaError::WrongRoom { entity: "task" }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RotaError::ManualTaskNotExist(task_id)),
        Err(e) => Err(RotaError::Database(e)),
    }
}
