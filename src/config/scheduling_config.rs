// ==========================================
// 针织排产系统 - 排产参数
// ==========================================
// 职责: 汇总所有可调常量 (默认日产量、换品种天数、评分权重)
// 来源: 默认值 + config_kv 覆写 (见 ConfigManager::load_scheduling_config)
// ==========================================

use crate::domain::plan::MAX_PLAN_DAYS;
use crate::domain::types::{MachineCategory, WorkflowStage};
use serde::{Deserialize, Serialize};

/// 排产参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// 全局兜底日产量 (kg/天)
    pub default_daily_rate: f64,

    /// 换品种天数：单面
    pub changeover_days_single: i64,
    /// 换品种天数：双面
    pub changeover_days_double: i64,
    /// 换品种天数：提花
    pub changeover_days_jacquard: i64,
    /// 换品种天数：未识别类别
    pub changeover_days_unknown: i64,

    /// 评分权重
    pub weights: ScoreWeights,

    /// 排队位置参考工序 (超过该工序视为已完成)
    pub queue_reference_stage: WorkflowStage,
}

/// 推荐评分权重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub proven_history: i64,        // 履历机台
    pub group_match: i64,           // 同类别机台
    pub not_in_history: i64,        // 不在履历 (强制分)
    pub spec_mismatch_ceiling: i64, // 规格不符 (分数上限)
    pub availability_base: i64,     // 空闲基础分
    pub availability_per_day: i64,  // 每等待一天扣分
    pub availability_max_penalty: i64,
    pub current_fabric_match: i64,  // 当前布种一致
    pub last_queued_fabric_match: i64,
    pub immediate_continuity: i64,  // 队列为空且当前布种一致
    pub same_client: i64,           // 同一客户
    pub unavailable_penalty: i64,   // 停机/维修扣分
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            proven_history: 100,
            group_match: 50,
            not_in_history: -2000,
            spec_mismatch_ceiling: -1000,
            availability_base: 50,
            availability_per_day: 5,
            availability_max_penalty: 70,
            current_fabric_match: 80,
            last_queued_fabric_match: 60,
            immediate_continuity: 20,
            same_client: 30,
            unavailable_penalty: -100,
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_daily_rate: 100.0,
            changeover_days_single: 2,
            changeover_days_double: 4,
            changeover_days_jacquard: 4,
            changeover_days_unknown: 2,
            weights: ScoreWeights::default(),
            queue_reference_stage: WorkflowStage::Dyeing,
        }
    }
}

impl SchedulingConfig {
    /// 按机台类别取换品种天数 (1 ..= MAX_PLAN_DAYS)
    pub fn changeover_days(&self, category: MachineCategory) -> i64 {
        let days = match category {
            MachineCategory::SingleJersey => self.changeover_days_single,
            MachineCategory::DoubleJersey => self.changeover_days_double,
            MachineCategory::Jacquard => self.changeover_days_jacquard,
            MachineCategory::Unknown => self.changeover_days_unknown,
        };
        days.clamp(1, MAX_PLAN_DAYS)
    }

    /// 全局兜底日产量 (非法配置时回落到 100)
    pub fn safe_default_rate(&self) -> f64 {
        if self.default_daily_rate.is_finite() && self.default_daily_rate > 0.0 {
            self.default_daily_rate
        } else {
            100.0
        }
    }
}
