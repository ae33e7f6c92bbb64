// ==========================================
// 针织排产系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod fabric_repo;
pub mod job_repo;
pub mod machine_repo;
pub mod order_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use fabric_repo::FabricRepository;
pub use job_repo::ProductionJobRepository;
pub use machine_repo::MachineRepository;
pub use order_repo::OrderRepository;

use crate::db::{init_schema, open_sqlite_connection};
use rusqlite::Connection;

/// 打开数据库文件并确保 schema 存在
///
/// 打开失败 → DatabaseConnectionError (附带路径)
pub fn open_repository_connection(db_path: &str) -> RepositoryResult<Connection> {
    let conn = open_sqlite_connection(db_path).map_err(|e| {
        RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e))
    })?;
    init_schema(&conn)?;
    Ok(conn)
}
