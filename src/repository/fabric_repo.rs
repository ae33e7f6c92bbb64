// ==========================================
// 针织排产系统 - 布种目录仓储
// ==========================================
// 机台覆写产量 / 生产履历 / 规格 以 JSON 文本存储
// ==========================================

use crate::domain::fabric::{FabricDefinition, FabricSpec};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::open_repository_connection;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct FabricRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FabricRepository {
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

    /// 查询全部布种定义 (按 fabric_id 排序)
    pub fn find_all(&self) -> RepositoryResult<Vec<FabricDefinition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT fabric_id, name, short_name, default_daily_rate,
                      machine_rate_overrides_json, compatible_machines_json, specs_json
               FROM fabrics ORDER BY fabric_id"#,
        )?;
        let fabrics = stmt
            .query_map([], map_fabric_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(fabrics)
    }

    pub fn upsert(&self, fabric: &FabricDefinition) -> RepositoryResult<()> {
        let overrides_json = serde_json::to_string(&fabric.machine_rate_overrides)?;
        let compatible_json = serde_json::to_string(&fabric.compatible_machines)?;
        let specs_json = fabric
            .specs
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO fabrics (
                   fabric_id, name, short_name, default_daily_rate,
                   machine_rate_overrides_json, compatible_machines_json, specs_json
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(fabric_id) DO UPDATE SET
                   name = excluded.name,
                   short_name = excluded.short_name,
                   default_daily_rate = excluded.default_daily_rate,
                   machine_rate_overrides_json = excluded.machine_rate_overrides_json,
                   compatible_machines_json = excluded.compatible_machines_json,
                   specs_json = excluded.specs_json"#,
            params![
                fabric.fabric_id,
                fabric.name,
                fabric.short_name,
                fabric.default_daily_rate,
                overrides_json,
                compatible_json,
                specs_json,
            ],
        )?;
        Ok(())
    }
}

fn map_fabric_row(row: &Row) -> rusqlite::Result<FabricDefinition> {
    let overrides_json: String = row.get(4)?;
    let compatible_json: String = row.get(5)?;
    let specs_json: Option<String> = row.get(6)?;

    let machine_rate_overrides: HashMap<String, f64> = serde_json::from_str(&overrides_json)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let compatible_machines: Vec<String> = serde_json::from_str(&compatible_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let specs: Option<FabricSpec> = match specs_json {
        Some(s) if !s.trim().is_empty() => Some(serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?),
        _ => None,
    };

    Ok(FabricDefinition {
        fabric_id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        default_daily_rate: row.get(3)?,
        machine_rate_overrides,
        compatible_machines,
        specs,
    })
}
