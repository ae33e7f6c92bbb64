// ==========================================
// 针织排产系统 - 配置层
// ==========================================
// 职责: 排产参数管理, 默认值 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod scheduling_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use scheduling_config::{ScoreWeights, SchedulingConfig};
