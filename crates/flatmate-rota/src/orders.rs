use std::sync::{Arc, Mutex};

use flatmate_core::types::{OrderId, RoomId, UserId};
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::{Result, RotaError};

/// Order lifecycle manager: creates and deletes rotation sequences and
/// serves the executor lookups both algorithms run on.
///
/// Orders are immutable after creation. The only membership mutation path
/// is delete-and-recreate, which is what keeps the dense-position invariant
/// safe without any in-place reordering logic.
pub struct OrderBook {
    db: Arc<Mutex<Connection>>,
    /// Orders per room.
    max_orders: u32,
}

impl OrderBook {
    pub fn new(db: Arc<Mutex<Connection>>, max_orders: u32) -> Self {
        Self { db, max_orders }
    }

    /// Create an order from a rotation sequence of user ids.
    ///
    /// Position equals list index; the same user may hold several slots.
    /// Every user must exist and belong to `room_id` — any failure aborts
    /// the transaction with nothing written.
    #[instrument(skip(self, users), fields(executors = users.len()))]
    pub fn create_order(&self, room_id: RoomId, users: &[UserId]) -> Result<OrderId> {
        if users.is_empty() {
            return Err(RotaError::EmptyOrder);
        }

        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM orders WHERE room_id = ?1",
            rusqlite::params![room_id],
            |row| row.get(0),
        )?;
        if existing >= self.max_orders as i64 {
            return Err(RotaError::TooManyOrders);
        }

        for &user_id in users {
            let member_room: Option<RoomId> = match tx.query_row(
                "SELECT room_id FROM users WHERE id = ?1",
                rusqlite::params![user_id],
                |row| row.get(0),
            ) {
                Ok(room) => room,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(RotaError::SpecifiedUserNotExist(user_id))
                }
                Err(e) => return Err(RotaError::Database(e)),
            };
            if member_room != Some(room_id) {
                return Err(RotaError::SpecifiedUserNotInRoom(user_id));
            }
        }

        tx.execute(
            "INSERT INTO orders (room_id) VALUES (?1)",
            rusqlite::params![room_id],
        )?;
        let order_id: OrderId = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO executors (order_id, position, user_id) VALUES (?1, ?2, ?3)",
            )?;
            for (position, &user_id) in users.iter().enumerate() {
                stmt.execute(rusqlite::params![order_id, position as i64, user_id])?;
            }
        }
        tx.commit()?;
        info!(room_id, order_id, "order created");
        Ok(order_id)
    }

    /// Delete an order. Executors cascade away; tasks bound to the order are
    /// unbound (and manual counters reset), never deleted.
    #[instrument(skip(self))]
    pub fn delete_order(&self, room_id: RoomId, order_id: OrderId) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        require_order(&tx, room_id, order_id)?;

        tx.execute(
            "UPDATE tasks SET order_id = NULL WHERE order_id = ?1",
            rusqlite::params![order_id],
        )?;
        tx.execute(
            "UPDATE manual_tasks SET order_id = NULL, counter = 0 WHERE order_id = ?1",
            rusqlite::params![order_id],
        )?;
        tx.execute("DELETE FROM orders WHERE id = ?1", rusqlite::params![order_id])?;
        tx.commit()?;
        info!(room_id, order_id, "order deleted");
        Ok(())
    }

    /// The rotation sequence of an order, in position order.
    pub fn order_info(&self, room_id: RoomId, order_id: OrderId) -> Result<Vec<UserId>> {
        let db = self.db.lock().unwrap();
        require_order(&db, room_id, order_id)?;
        executor_users(&db, order_id)
    }

    /// True if any periodic or manual task references the order.
    pub fn is_in_use(&self, room_id: RoomId, order_id: OrderId) -> Result<bool> {
        let db = self.db.lock().unwrap();
        require_order(&db, room_id, order_id)?;
        let in_use: bool = db.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE order_id = ?1)
                 OR EXISTS(SELECT 1 FROM manual_tasks WHERE order_id = ?1)",
            rusqlite::params![order_id],
            |row| row.get(0),
        )?;
        Ok(in_use)
    }

    /// All orders of a room with their rotation sequences.
    pub fn list_for_room(&self, room_id: RoomId) -> Result<Vec<(OrderId, Vec<UserId>)>> {
        let db = self.db.lock().unwrap();
        let ids = {
            let mut stmt = db.prepare("SELECT id FROM orders WHERE room_id = ?1 ORDER BY id")?;
            let ids = stmt
                .query_map(rusqlite::params![room_id], |row| row.get::<_, OrderId>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
        };
        let mut orders = Vec::with_capacity(ids.len());
        for order_id in ids {
            orders.push((order_id, executor_users(&db, order_id)?));
        }
        Ok(orders)
    }

    /// The full (position, user) assignment of an order.
    pub fn executors(&self, order_id: OrderId) -> Result<Vec<(i64, UserId)>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT position, user_id FROM executors WHERE order_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![order_id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn executor_count(&self, order_id: OrderId) -> Result<i64> {
        let db = self.db.lock().unwrap();
        count_executors(&db, order_id)
    }

    /// Keyed lookup of the executor at a position. A missing row is a
    /// dense-range invariant breach, not a user error.
    pub fn executor_at(&self, order_id: OrderId, position: i64) -> Result<UserId> {
        let db = self.db.lock().unwrap();
        executor_at(&db, order_id, position)
    }
}

pub(crate) fn count_executors(conn: &Connection, order_id: OrderId) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM executors WHERE order_id = ?1",
        rusqlite::params![order_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

pub(crate) fn executor_at(conn: &Connection, order_id: OrderId, position: i64) -> Result<UserId> {
    match conn.query_row(
        "SELECT user_id FROM executors WHERE order_id = ?1 AND position = ?2",
        rusqlite::params![order_id, position],
        |row| row.get(0),
    ) {
        Ok(user_id) => Ok(user_id),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(RotaError::MissingExecutor { order_id, position })
        }
        Err(e) => Err(RotaError::Database(e)),
    }
}

fn executor_users(conn: &Connection, order_id: OrderId) -> Result<Vec<UserId>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM executors WHERE order_id = ?1 ORDER BY position")?;
    let users = stmt
        .query_map(rusqlite::params![order_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Shared room-scope check for order references, used by the task managers
/// when validating bindings.
pub(crate) fn require_order(conn: &Connection, room_id: RoomId, order_id: OrderId) -> Result<()> {
    match conn.query_row(
        "SELECT room_id FROM orders WHERE id = ?1",
        rusqlite::params![order_id],
        |row| row.get::<_, RoomId>(0),
    ) {
        Ok(owner) if owner == room_id => Ok(()),
        Ok(_) => Err(RotaError::WrongRoom { entity: "order" }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RotaError::OrderNotExist(order_id)),
        Err(e) => Err(RotaError::Database(e)),
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::room_with_members;
    use super::*;

    #[test]
    fn positions_are_dense_and_ordered() {
        let (db, room_id) = room_with_members(3);
        let orders = OrderBook::new(db, 10);
        // duplicate slot for user 2 is allowed
        let order_id = orders.create_order(room_id, &[2, 1, 2]).unwrap();

        let executors = orders.executors(order_id).unwrap();
        let positions: Vec<i64> = executors.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(orders.order_info(room_id, order_id).unwrap(), vec![2, 1, 2]);
        assert_eq!(orders.executor_count(order_id).unwrap(), 3);
        assert_eq!(orders.executor_at(order_id, 2).unwrap(), 2);
    }

    #[test]
    fn non_member_aborts_with_nothing_written() {
        let (db, room_id) = room_with_members(2);
        let orders = OrderBook::new(Arc::clone(&db), 10);

        // user 9 is registered but roomless
        flatmate_rooms::RoomDirectory::new(Arc::clone(&db))
            .create_user(9)
            .unwrap();
        assert!(matches!(
            orders.create_order(room_id, &[1, 9]),
            Err(RotaError::SpecifiedUserNotInRoom(9))
        ));
        assert!(matches!(
            orders.create_order(room_id, &[1, 77]),
            Err(RotaError::SpecifiedUserNotExist(77))
        ));

        let conn = db.lock().unwrap();
        let orders_left: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |r| r.get(0))
            .unwrap();
        let executors_left: i64 = conn
            .query_row("SELECT COUNT(*) FROM executors", [], |r| r.get(0))
            .unwrap();
        assert_eq!((orders_left, executors_left), (0, 0));
    }

    #[test]
    fn per_room_cap_enforced() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(db, 2);
        orders.create_order(room_id, &[1]).unwrap();
        orders.create_order(room_id, &[1]).unwrap();
        assert!(matches!(
            orders.create_order(room_id, &[1]),
            Err(RotaError::TooManyOrders)
        ));
    }

    #[test]
    fn empty_executor_list_rejected() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(db, 10);
        assert!(matches!(
            orders.create_order(room_id, &[]),
            Err(RotaError::EmptyOrder)
        ));
    }

    #[test]
    fn delete_cascades_executors() {
        let (db, room_id) = room_with_members(2);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1, 2]).unwrap();
        orders.delete_order(room_id, order_id).unwrap();

        assert!(matches!(
            orders.order_info(room_id, order_id),
            Err(RotaError::OrderNotExist(_))
        ));
        let left: i64 = db
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM executors", [], |r| r.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn cross_room_order_hidden() {
        let (db, room_id) = room_with_members(1);
        let orders = OrderBook::new(Arc::clone(&db), 10);
        let order_id = orders.create_order(room_id, &[1]).unwrap();

        let dir = flatmate_rooms::RoomDirectory::new(Arc::clone(&db));
        dir.create_user(50).unwrap();
        let other_room = dir.create_room(50, "other").unwrap();
        assert!(matches!(
            orders.order_info(other_room, order_id),
            Err(RotaError::WrongRoom { entity: "order" })
        ));
    }
}
