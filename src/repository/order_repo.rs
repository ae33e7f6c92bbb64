// ==========================================
// 针织排产系统 - 订单仓储
// ==========================================

use crate::domain::order::Order;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::open_repository_connection;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_repository_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                r#"SELECT order_id, customer, fabric, required_quantity, remaining_quantity, reference
                   FROM orders WHERE order_id = ?"#,
                params![order_id],
                map_order_row,
            )
            .optional()?;
        Ok(order)
    }

    /// 按ID查询订单 (不存在 → NotFound)
    pub fn get(&self, order_id: &str) -> RepositoryResult<Order> {
        self.find_by_id(order_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            })
    }

    pub fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT order_id, customer, fabric, required_quantity, remaining_quantity, reference
               FROM orders ORDER BY order_id"#,
        )?;
        let orders = stmt
            .query_map([], map_order_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    pub fn upsert(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO orders (order_id, customer, fabric, required_quantity, remaining_quantity, reference)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               ON CONFLICT(order_id) DO UPDATE SET
                   customer = excluded.customer,
                   fabric = excluded.fabric,
                   required_quantity = excluded.required_quantity,
                   remaining_quantity = excluded.remaining_quantity,
                   reference = excluded.reference"#,
            params![
                order.order_id,
                order.customer,
                order.fabric,
                order.required_quantity,
                order.remaining_quantity,
                order.reference,
            ],
        )?;
        Ok(())
    }
}

fn map_order_row(row: &Row) -> rusqlite::Result<Order> {
    Ok(Order {
        order_id: row.get(0)?,
        customer: row.get(1)?,
        fabric: row.get(2)?,
        required_quantity: row.get(3)?,
        remaining_quantity: row.get(4)?,
        reference: row.get(5)?,
    })
}
