// ==========================================
// 针织排产系统 - 应用层
// ==========================================
// 职责: 组装仓储与 API, 供 CLI 使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
