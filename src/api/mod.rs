// ==========================================
// 针织排产系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 调用
// ==========================================

pub mod error;
pub mod queue_api;
pub mod scheduling_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use queue_api::QueueApi;
pub use scheduling_api::{
    QueueUpdateResponse, ScheduleOrderRequest, ScheduleOrderResponse, SchedulingApi,
};
