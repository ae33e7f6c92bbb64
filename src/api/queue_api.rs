// ==========================================
// 针织排产系统 - 排队位置 API
// ==========================================
// 只读: 按需重算, 不写库
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::job::QueueInfo;
use crate::engine::queue_position::QueuePositionCalculator;
use crate::repository::ProductionJobRepository;

pub struct QueueApi {
    job_repo: Arc<ProductionJobRepository>,
    config_manager: Arc<ConfigManager>,
}

impl QueueApi {
    pub fn new(job_repo: Arc<ProductionJobRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            job_repo,
            config_manager,
        }
    }

    /// 查询批次排队位置
    ///
    /// # 返回
    /// - Ok(None): 同组仅一个批次或分组键为空, 无需展示
    ///
    /// # 错误
    /// - `ApiError::NotFound`: 批次不存在
    pub fn queue_info(&self, job_id: &str) -> ApiResult<Option<QueueInfo>> {
        if job_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次ID不能为空".to_string()));
        }

        let config = self
            .config_manager
            .load_scheduling_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let job = self
            .job_repo
            .find_by_id(job_id)?
            .ok_or_else(|| ApiError::NotFound(format!("ProductionJob(id={})不存在", job_id)))?;

        let group = self.job_repo.find_by_capacity_key(&job.capacity_key)?;
        let info = QueuePositionCalculator::from_config(&config).queue_info(&group, job_id);

        tracing::debug!(job_id, capacity_key = %job.capacity_key, ?info, "排队位置");
        Ok(info)
    }
}
