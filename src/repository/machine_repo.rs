// ==========================================
// 针织排产系统 - 机台仓储
// ==========================================
// 职责: machines 表读写; 队列以 JSON 文本整体存储
// 红线: 队列只能通过 replace_queue 写入 (revision 乐观锁)
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::plan::PlanItem;
use crate::domain::types::MachineStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::open_repository_connection;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT machine_id, name, machine_type, gauge, diameter, needle_count, status,
           fabric, client, daily_rate, avg_daily_rate, remaining_quantity,
           queue_json, revision
    FROM machines
"#;

pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    /// 打开数据库文件并确保 schema 存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_repository_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部机台 (按 machine_id 排序, 即推荐时的原始顺序)
    pub fn find_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY machine_id", SELECT_COLUMNS))?;
        let machines = stmt
            .query_map([], map_machine_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(machines)
    }

    /// 按ID查询机台
    pub fn find_by_id(&self, machine_id: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let machine = conn
            .query_row(
                &format!("{} WHERE machine_id = ?", SELECT_COLUMNS),
                params![machine_id],
                map_machine_row,
            )
            .optional()?;
        Ok(machine)
    }

    /// 按ID查询机台 (不存在 → NotFound)
    pub fn get(&self, machine_id: &str) -> RepositoryResult<Machine> {
        self.find_by_id(machine_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Machine".to_string(),
                id: machine_id.to_string(),
            })
    }

    /// 新增或更新机台主数据
    ///
    /// # 说明
    /// - 新增时写入 queue 与 revision
    /// - 已存在时只更新主数据与当前任务字段, 不触碰 queue / revision
    pub fn upsert(&self, machine: &Machine) -> RepositoryResult<()> {
        let queue_json = serde_json::to_string(&machine.queue)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO machines (
                   machine_id, name, machine_type, gauge, diameter, needle_count, status,
                   fabric, client, daily_rate, avg_daily_rate, remaining_quantity,
                   queue_json, revision, last_updated
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, datetime('now'))
               ON CONFLICT(machine_id) DO UPDATE SET
                   name = excluded.name,
                   machine_type = excluded.machine_type,
                   gauge = excluded.gauge,
                   diameter = excluded.diameter,
                   needle_count = excluded.needle_count,
                   status = excluded.status,
                   fabric = excluded.fabric,
                   client = excluded.client,
                   daily_rate = excluded.daily_rate,
                   avg_daily_rate = excluded.avg_daily_rate,
                   remaining_quantity = excluded.remaining_quantity,
                   last_updated = datetime('now')"#,
            params![
                machine.machine_id,
                machine.name,
                machine.machine_type,
                machine.gauge,
                machine.diameter,
                machine.needle_count,
                machine.status.to_db_str(),
                machine.fabric,
                machine.client,
                machine.daily_rate,
                machine.avg_daily_rate,
                machine.remaining_quantity,
                queue_json,
                machine.revision,
            ],
        )?;
        Ok(())
    }

    /// 整体替换队列 (带乐观锁检查)
    ///
    /// # 并发控制
    /// `UPDATE ... WHERE revision = ?`: 两个并发编辑只有一个成功
    ///
    /// # 返回
    /// - Ok(new_revision)
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision不匹配 (其他人已更新)
    /// - `RepositoryError::NotFound`: machine_id不存在
    pub fn replace_queue(
        &self,
        machine_id: &str,
        queue: &[PlanItem],
        expected_revision: i32,
    ) -> RepositoryResult<i32> {
        let queue_json = serde_json::to_string(queue)?;
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE machines
               SET queue_json = ?, revision = revision + 1, last_updated = datetime('now')
               WHERE machine_id = ? AND revision = ?"#,
            params![queue_json, machine_id, expected_revision],
        )?;

        if rows_affected == 0 {
            // 判断是记录不存在还是revision冲突
            let actual: Option<i32> = conn
                .query_row(
                    "SELECT revision FROM machines WHERE machine_id = ?",
                    params![machine_id],
                    |row| row.get(0),
                )
                .optional()?;

            return match actual {
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    machine_id: machine_id.to_string(),
                    expected: expected_revision,
                    actual,
                }),
                None => Err(RepositoryError::NotFound {
                    entity: "Machine".to_string(),
                    id: machine_id.to_string(),
                }),
            };
        }

        tracing::debug!(machine_id, new_revision = expected_revision + 1, "队列已替换");
        Ok(expected_revision + 1)
    }

    /// 删除机台
    pub fn delete(&self, machine_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM machines WHERE machine_id = ?", params![machine_id])?;
        Ok(())
    }
}

fn map_machine_row(row: &Row) -> rusqlite::Result<Machine> {
    let status_str: String = row.get(6)?;
    let queue_json: String = row.get(12)?;
    let queue: Vec<PlanItem> = serde_json::from_str(&queue_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(12, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Machine {
        machine_id: row.get(0)?,
        name: row.get(1)?,
        machine_type: row.get(2)?,
        gauge: row.get(3)?,
        diameter: row.get(4)?,
        needle_count: row.get(5)?,
        status: MachineStatus::from_str(&status_str),
        fabric: row.get(7)?,
        client: row.get(8)?,
        daily_rate: row.get(9)?,
        avg_daily_rate: row.get(10)?,
        remaining_quantity: row.get(11)?,
        queue,
        revision: row.get(13)?,
    })
}
