// ==========================================
// 针织排产系统 - 生产批次领域模型
// ==========================================
// 用途: 共享产能机台的排队位置展示
// ==========================================

use crate::domain::types::WorkflowStage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionJob {
    pub job_id: String,                     // 批次ID
    pub capacity_key: String,               // 机台 / 产能分组键
    pub formation_date: Option<NaiveDate>,  // 建单日期
    pub stage: WorkflowStage,               // 当前工序阶段
}

/// 排队位置信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub position: usize,          // 位置 (从 1 开始)
    pub total: usize,             // 同组批次数
    pub finished_before: usize,   // 前方已过参考工序的批次数
    pub still_ahead_count: usize, // 前方仍在等待的批次数
}
