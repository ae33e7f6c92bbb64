// ==========================================
// 针织排产系统 - 生产批次仓储
// ==========================================
// 排队位置展示的数据来源 (只读计算, 写入仅供导入/测试)
// ==========================================

use crate::domain::job::ProductionJob;
use crate::domain::types::WorkflowStage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::open_repository_connection;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct ProductionJobRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionJobRepository {
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

    /// 查询同一产能分组的全部批次
    pub fn find_by_capacity_key(&self, capacity_key: &str) -> RepositoryResult<Vec<ProductionJob>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT job_id, capacity_key, formation_date, stage
               FROM production_jobs WHERE capacity_key = ? ORDER BY rowid"#,
        )?;
        let jobs = stmt
            .query_map(params![capacity_key], map_job_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    pub fn find_all(&self) -> RepositoryResult<Vec<ProductionJob>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT job_id, capacity_key, formation_date, stage FROM production_jobs ORDER BY rowid",
        )?;
        let jobs = stmt
            .query_map([], map_job_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    pub fn find_by_id(&self, job_id: &str) -> RepositoryResult<Option<ProductionJob>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT job_id, capacity_key, formation_date, stage FROM production_jobs WHERE job_id = ?",
        )?;
        let mut rows = stmt.query_map(params![job_id], map_job_row)?;
        Ok(rows.next().transpose()?)
    }

    pub fn upsert(&self, job: &ProductionJob) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO production_jobs (job_id, capacity_key, formation_date, stage)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(job_id) DO UPDATE SET
                   capacity_key = excluded.capacity_key,
                   formation_date = excluded.formation_date,
                   stage = excluded.stage"#,
            params![
                job.job_id,
                job.capacity_key,
                job.formation_date.map(|d| d.format("%Y-%m-%d").to_string()),
                job.stage.to_db_str(),
            ],
        )?;
        Ok(())
    }
}

fn map_job_row(row: &Row) -> rusqlite::Result<ProductionJob> {
    let formation_date_str: Option<String> = row.get(2)?;
    let stage_str: String = row.get(3)?;

    // 无法解析的日期按缺失处理 (排最后)
    let formation_date = formation_date_str
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());

    Ok(ProductionJob {
        job_id: row.get(0)?,
        capacity_key: row.get(1)?,
        formation_date,
        stage: WorkflowStage::from_str(&stage_str),
    })
}
