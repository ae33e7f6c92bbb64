// ==========================================
// 针织排产系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{QueueApi, SchedulingApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{
    FabricRepository, MachineRepository, OrderRepository, ProductionJobRepository,
};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 排产API
    pub scheduling_api: Arc<SchedulingApi>,

    /// 排队位置API
    pub queue_api: Arc<QueueApi>,

    /// 机台仓储 (CLI 直接查看队列)
    pub machine_repo: Arc<MachineRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开共享连接并初始化 schema
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库schema: {}", e))?;
        match read_schema_version(&conn) {
            Ok(v) => tracing::debug!(schema_version = ?v, "schema 就绪"),
            Err(e) => tracing::warn!("schema_version 读取失败(将继续启动): {}", e),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let machine_repo = Arc::new(MachineRepository::from_connection(conn.clone()));
        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));
        let fabric_repo = Arc::new(FabricRepository::from_connection(conn.clone()));
        let job_repo = Arc::new(ProductionJobRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 创建API实例
        // ==========================================
        let scheduling_api = Arc::new(SchedulingApi::new(
            machine_repo.clone(),
            order_repo,
            fabric_repo,
            config_manager.clone(),
        ));
        let queue_api = Arc::new(QueueApi::new(job_repo, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            scheduling_api,
            queue_api,
            machine_repo,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 TEXTILE_APS_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("TEXTILE_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./textile_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("textile-aps");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("textile_aps.db");
        }
    }

    path.to_string_lossy().to_string()
}
