use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use flatmate_core::types::{OrderId, RoomId, TaskId};
use rusqlite::Connection;
use tracing::{error, info, instrument};

use crate::db::{row_to_task, TASK_SELECT_SQL};
use crate::error::{Result, RotaError};
use crate::orders::{count_executors, executor_at, require_order};
use crate::rotation::{is_today_duty, today_index};
use crate::types::{DutyLine, Task, TaskBrief, TaskPatch, TodayDuty};

/// Manager for periodic tasks. Rotation is stateless: every evaluation
/// recomputes today's position from the start date, period, and the bound
/// order's current executor count.
pub struct TaskManager {
    db: Arc<Mutex<Connection>>,
    /// Periodic tasks per room.
    max_tasks: u32,
}

impl TaskManager {
    pub fn new(db: Arc<Mutex<Connection>>, max_tasks: u32) -> Self {
        Self { db, max_tasks }
    }

    /// Create a periodic task, optionally bound to an order of the same room.
    #[instrument(skip(self, name, description, start_at))]
    pub fn create(
        &self,
        room_id: RoomId,
        name: &str,
        description: Option<&str>,
        start_at: DateTime<Utc>,
        period: i64,
        order_id: Option<OrderId>,
    ) -> Result<TaskId> {
        let db = self.db.lock().unwrap();
        let existing: i64 = db.query_row(
            "SELECT COUNT(*) FROM tasks WHERE room_id = ?1",
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
            "INSERT INTO tasks (room_id, name, description, start_at, period_days, order_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                room_id,
                name,
                description,
                start_at.to_rfc3339(),
                period,
                order_id
            ],
        )?;
        let id = db.last_insert_rowid();
        info!(room_id, task_id = id, "periodic task created");
        Ok(id)
    }

    /// Apply a partial update. A supplied `order_id` is re-validated exactly
    /// as at creation; absent fields keep their prior values.
    #[instrument(skip(self, patch))]
    pub fn modify(&self, room_id: RoomId, task_id: TaskId, patch: &TaskPatch) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        require_task(&tx, room_id, task_id)?;

        if let Some(ref name) = patch.name {
            tx.execute(
                "UPDATE tasks SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, task_id],
            )?;
        }
        if let Some(ref description) = patch.description {
            tx.execute(
                "UPDATE tasks SET description = ?1 WHERE id = ?2",
                rusqlite::params![description, task_id],
            )?;
        }
        if let Some(start_at) = patch.start_at {
            tx.execute(
                "UPDATE tasks SET start_at = ?1 WHERE id = ?2",
                rusqlite::params![start_at.to_rfc3339(), task_id],
            )?;
        }
        if let Some(period) = patch.period {
            tx.execute(
                "UPDATE tasks SET period_days = ?1 WHERE id = ?2",
                rusqlite::params![period, task_id],
            )?;
        }
        if let Some(order_id) = patch.order_id {
            require_order(&tx, room_id, order_id)?;
            tx.execute(
                "UPDATE tasks SET order_id = ?1 WHERE id = ?2",
                rusqlite::params![order_id, task_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Explicitly clear optional fields. Distinct from `modify` because
    /// "set to null" and "leave unchanged" must be distinguishable.
    #[instrument(skip(self))]
    pub fn remove_parameters(
        &self,
        room_id: RoomId,
        task_id: TaskId,
        description: bool,
        order_id: bool,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_task(&db, room_id, task_id)?;
        if description {
            db.execute(
                "UPDATE tasks SET description = NULL WHERE id = ?1",
                rusqlite::params![task_id],
            )?;
        }
        if order_id {
            db.execute(
                "UPDATE tasks SET order_id = NULL WHERE id = ?1",
                rusqlite::params![task_id],
            )?;
        }
        Ok(())
    }

    pub fn list(&self, room_id: RoomId, now: DateTime<Utc>) -> Result<Vec<TaskBrief>> {
        let db = self.db.lock().unwrap();
        let tasks = room_tasks(&db, room_id)?;
        Ok(tasks
            .into_iter()
            .map(|t| TaskBrief {
                id: t.id,
                name: t.name.clone(),
                inactive: t.is_inactive(now),
            })
            .collect())
    }

    pub fn info(&self, room_id: RoomId, task_id: TaskId) -> Result<Task> {
        let db = self.db.lock().unwrap();
        require_task(&db, room_id, task_id)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, room_id: RoomId, task_id: TaskId) -> Result<()> {
        let db = self.db.lock().unwrap();
        require_task(&db, room_id, task_id)?;
        db.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![task_id])?;
        Ok(())
    }

    /// Evaluate one task for `now`: inactive, off-period, or today's duty.
    pub fn compute_today(
        &self,
        room_id: RoomId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<TodayDuty> {
        let db = self.db.lock().unwrap();
        let task = require_task(&db, room_id, task_id)?;
        evaluate(&db, &task, now)
    }

    /// All periodic tasks of the room due today, with today's executor.
    /// Off-period and inactive tasks are omitted, not shown stale.
    pub fn daily_duties(&self, room_id: RoomId, now: DateTime<Utc>) -> Result<Vec<DutyLine>> {
        let db = self.db.lock().unwrap();
        let mut duties = Vec::new();
        for task in room_tasks(&db, room_id)? {
            match evaluate(&db, &task, now)? {
                TodayDuty::Duty(user_id) => duties.push(DutyLine {
                    task_id: task.id,
                    name: task.name,
                    user_id,
                }),
                TodayDuty::Inactive | TodayDuty::NotToday => {}
            }
        }
        Ok(duties)
    }
}

fn evaluate(conn: &Connection, task: &Task, now: DateTime<Utc>) -> Result<TodayDuty> {
    let Some(order_id) = task.order_id else {
        return Ok(TodayDuty::Inactive);
    };
    if task.start_at > now {
        return Ok(TodayDuty::Inactive);
    }
    if !is_today_duty(task.start_at, task.period, now) {
        return Ok(TodayDuty::NotToday);
    }

    let count = count_executors(conn, order_id)?;
    if count == 0 {
        error!(task_id = task.id, order_id, "bound order has no executors");
        return Err(RotaError::EmptyOrder);
    }
    let position = today_index(task.start_at, task.period, now, count);
    let user_id = executor_at(conn, order_id, position).inspect_err(|e| {
        if e.is_consistency() {
            error!(task_id = task.id, order_id, position, "dense-range invariant breach");
        }
    })?;
    Ok(TodayDuty::Duty(user_id))
}

fn room_tasks(conn: &Connection, room_id: RoomId) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE room_id = ?1 ORDER BY id"))?;
    let tasks = stmt
        .query_map(rusqlite::params![room_id], row_to_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

fn require_task(conn: &Connection, room_id: RoomId, task_id: TaskId) -> Result<Task> {
    match conn.query_row(
        &format!("{TASK_SELECT_SQL} WHERE id = ?1"),
        rusqlite::params![task_id],
        row_to_task,
    ) {
        Ok(task) if task.room_id == room_id => Ok(task),
        Ok(_) => Err(RotaError::WrongRoom { entity: "task" }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RotaError::TaskNotExist(task_id)),
        Err(e) => Err(RotaError::Database(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::testutil::room_with_members;
    use crate::orders::OrderBook;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2024-06-10T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn duty_rotates_by_elapsed_days() {
        let (db, room_id) = room_with_members(2);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1, 2]).unwrap();

        // started two days ago, daily period: an even step count, so duty
        // is back at position 0
        let id = tasks
            .create(room_id, "dishes", None, now() - Duration::days(2), 1, Some(order_id))
            .unwrap();
        assert_eq!(tasks.compute_today(room_id, id, now()).unwrap(), TodayDuty::Duty(1));

        let patch = TaskPatch {
            start_at: Some(now() - Duration::days(1)),
            ..Default::default()
        };
        tasks.modify(room_id, id, &patch).unwrap();
        assert_eq!(tasks.compute_today(room_id, id, now()).unwrap(), TodayDuty::Duty(2));
    }

    #[test]
    fn future_start_or_unbound_is_inactive() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1]).unwrap();

        let unbound = tasks
            .create(room_id, "a", None, now() - Duration::days(1), 1, None)
            .unwrap();
        let future = tasks
            .create(room_id, "b", None, now() + Duration::days(3), 1, Some(order_id))
            .unwrap();
        assert_eq!(
            tasks.compute_today(room_id, unbound, now()).unwrap(),
            TodayDuty::Inactive
        );
        assert_eq!(
            tasks.compute_today(room_id, future, now()).unwrap(),
            TodayDuty::Inactive
        );
        assert!(tasks.daily_duties(room_id, now()).unwrap().is_empty());
    }

    #[test]
    fn off_period_tasks_omitted_from_daily_duties() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1]).unwrap();

        tasks
            .create(room_id, "every third day", None, now() - Duration::days(1), 3, Some(order_id))
            .unwrap();
        let due = tasks
            .create(room_id, "daily", None, now() - Duration::days(1), 1, Some(order_id))
            .unwrap();

        let duties = tasks.daily_duties(room_id, now()).unwrap();
        assert_eq!(duties.len(), 1);
        assert_eq!(duties[0].task_id, due);
    }

    #[test]
    fn deleting_bound_order_deactivates_task() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1]).unwrap();
        let id = tasks
            .create(room_id, "dishes", None, now() - Duration::days(1), 1, Some(order_id))
            .unwrap();

        orders.delete_order(room_id, order_id).unwrap();
        let task = tasks.info(room_id, id).unwrap();
        assert_eq!(task.order_id, None);
        assert!(task.is_inactive(now()));
    }

    #[test]
    fn cross_room_binding_rejected() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);

        let dir = flatmate_rooms::RoomDirectory::new(Arc::clone(&db));
        dir.create_user(60).unwrap();
        let other_room = dir.create_room(60, "other").unwrap();
        let foreign_order = orders.create_order(other_room, &[60]).unwrap();

        assert!(matches!(
            tasks.create(room_id, "t", None, now(), 1, Some(foreign_order)),
            Err(RotaError::WrongRoom { entity: "order" })
        ));
    }

    #[test]
    fn remove_parameters_clears_only_flagged_fields() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let tasks = TaskManager::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1]).unwrap();
        let id = tasks
            .create(room_id, "t", Some("desc"), now(), 2, Some(order_id))
            .unwrap();

        tasks.remove_parameters(room_id, id, true, false).unwrap();
        let task = tasks.info(room_id, id).unwrap();
        assert_eq!(task.description, None);
        assert_eq!(task.order_id, Some(order_id));

        tasks.remove_parameters(room_id, id, false, true).unwrap();
        assert_eq!(tasks.info(room_id, id).unwrap().order_id, None);
    }

    #[test]
    fn task_cap_enforced() {
        let (db, room_id) = room_with_members(1);
        let tasks = TaskManager::new(db, 1);
        tasks.create(room_id, "a", None, now(), 1, None).unwrap();
        assert!(matches!(
            tasks.create(room_id, "b", None, now(), 1, None),
            Err(RotaError::TooManyTasks)
        ));
    }
}
