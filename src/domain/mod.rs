// ==========================================
// 针织排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod fabric;
pub mod job;
pub mod machine;
pub mod order;
pub mod plan;
pub mod types;

// 重导出核心类型
pub use fabric::{FabricDefinition, FabricSpec};
pub use job::{ProductionJob, QueueInfo};
pub use machine::Machine;
pub use order::Order;
pub use plan::{add_days, PlanItem, MAX_PLAN_DAYS};
pub use types::{MachineCategory, MachineStatus, PlanItemKind, WorkflowStage};
