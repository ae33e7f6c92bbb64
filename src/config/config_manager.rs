// ==========================================
// 针织排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::scheduling_config::{ScoreWeights, SchedulingConfig};
use crate::db::open_sqlite_connection;
use crate::domain::types::WorkflowStage;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 加载排产参数（默认值 + config_kv 覆写）
    ///
    /// # 说明
    /// - 配置缺失 → 使用默认值
    /// - 配置格式错误 → 告警并使用默认值（不阻断排产）
    pub fn load_scheduling_config(&self) -> Result<SchedulingConfig, Box<dyn Error>> {
        let mut config = SchedulingConfig::default();

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_DAILY_RATE)? {
            match v.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate > 0.0 => config.default_daily_rate = rate,
                _ => warn_invalid(config_keys::DEFAULT_DAILY_RATE, &v),
            }
        }

        let day_keys = [
            (config_keys::CHANGEOVER_DAYS_SINGLE, &mut config.changeover_days_single),
            (config_keys::CHANGEOVER_DAYS_DOUBLE, &mut config.changeover_days_double),
            (config_keys::CHANGEOVER_DAYS_JACQUARD, &mut config.changeover_days_jacquard),
            (config_keys::CHANGEOVER_DAYS_UNKNOWN, &mut config.changeover_days_unknown),
        ];
        for (key, slot) in day_keys {
            if let Some(v) = self.get_config_value(key)? {
                match v.trim().parse::<i64>() {
                    Ok(days) if days >= 1 => *slot = days,
                    _ => warn_invalid(key, &v),
                }
            }
        }

        if let Some(v) = self.get_config_value(config_keys::SCORE_WEIGHTS)? {
            match serde_json::from_str::<ScoreWeights>(&v) {
                Ok(weights) => config.weights = weights,
                Err(_) => warn_invalid(config_keys::SCORE_WEIGHTS, &v),
            }
        }

        if let Some(v) = self.get_config_value(config_keys::QUEUE_REFERENCE_STAGE)? {
            config.queue_reference_stage = WorkflowStage::from_str(&v);
        }

        Ok(config)
    }
}

fn warn_invalid(key: &str, raw: &str) {
    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 日产量
    pub const DEFAULT_DAILY_RATE: &str = "default_daily_rate";

    // 换品种天数
    pub const CHANGEOVER_DAYS_SINGLE: &str = "changeover_days_single";
    pub const CHANGEOVER_DAYS_DOUBLE: &str = "changeover_days_double";
    pub const CHANGEOVER_DAYS_JACQUARD: &str = "changeover_days_jacquard";
    pub const CHANGEOVER_DAYS_UNKNOWN: &str = "changeover_days_unknown";

    // 推荐评分权重 (JSON)
    pub const SCORE_WEIGHTS: &str = "score_weights";

    // 排队位置参考工序
    pub const QUEUE_REFERENCE_STAGE: &str = "queue_reference_stage";
}
