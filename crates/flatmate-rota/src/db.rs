use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};

use crate::types::{ManualTask, Task};

/// Initialise the rotation schema. Idempotent; call on every startup, after
/// `flatmate_rooms::db::init_db` (the foreign keys below reference `rooms`
/// and `users`).
///
/// `ON DELETE SET NULL` on the task tables implements the lifecycle rule
/// that deleting an order deactivates its tasks instead of deleting them.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS orders (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id INTEGER NOT NULL REFERENCES rooms(id)
                        ON UPDATE CASCADE ON DELETE CASCADE
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_orders_room ON orders (room_id);

        -- Composite PK gives O(1) lookup by (order, position), the hot path
        -- of both rotation algorithms.
        CREATE TABLE IF NOT EXISTS executors (
            order_id INTEGER NOT NULL REFERENCES orders(id)
                         ON UPDATE CASCADE ON DELETE CASCADE,
            position INTEGER NOT NULL,
            user_id  INTEGER NOT NULL REFERENCES users(id)
                         ON UPDATE CASCADE ON DELETE CASCADE,
            PRIMARY KEY (order_id, position)
        ) STRICT;

        CREATE TABLE IF NOT EXISTS tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id     INTEGER NOT NULL REFERENCES rooms(id)
                            ON UPDATE CASCADE ON DELETE CASCADE,
            name        TEXT NOT NULL,
            description TEXT,
            start_at    TEXT NOT NULL,
            period_days INTEGER NOT NULL CHECK (period_days > 0),
            order_id    INTEGER REFERENCES orders(id)
                            ON UPDATE CASCADE ON DELETE SET NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_tasks_room ON tasks (room_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_order ON tasks (order_id);

        CREATE TABLE IF NOT EXISTS manual_tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id     INTEGER NOT NULL REFERENCES rooms(id)
                            ON UPDATE CASCADE ON DELETE CASCADE,
            name        TEXT NOT NULL,
            description TEXT,
            counter     INTEGER NOT NULL DEFAULT 0,
            order_id    INTEGER REFERENCES orders(id)
                            ON UPDATE CASCADE ON DELETE SET NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_manual_tasks_room ON manual_tasks (room_id);
        CREATE INDEX IF NOT EXISTS idx_manual_tasks_order ON manual_tasks (order_id);
        ",
    )
}

pub(crate) const TASK_SELECT_SQL: &str =
    "SELECT id, room_id, name, description, start_at, period_days, order_id FROM tasks";

pub(crate) const MANUAL_SELECT_SQL: &str =
    "SELECT id, room_id, name, description, counter, order_id FROM manual_tasks";

/// Column order from TASK_SELECT_SQL.
pub(crate) fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        room_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        start_at: parse_ts(row, 4)?,
        period: row.get(5)?,
        order_id: row.get(6)?,
    })
}

/// Column order from MANUAL_SELECT_SQL.
pub(crate) fn row_to_manual_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<ManualTask> {
    Ok(ManualTask {
        id: row.get(0)?,
        room_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        counter: row.get(4)?,
        order_id: row.get(5)?,
    })
}

fn parse_ts(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
