// ==========================================
// 针织排产系统 - 机台领域模型
// ==========================================
// 不变式: 每台机台至多一个当前任务; queue 顺序即执行顺序
// 红线: queue 只能经 MachineRepository::replace_queue 整体替换 (带 revision 校验)
// ==========================================

use crate::domain::plan::PlanItem;
use crate::domain::types::{MachineCategory, MachineStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 织机
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: String,           // 机台ID
    pub name: String,                 // 机台名称 (履历匹配用)
    pub machine_type: String,         // 类型文本 (Single/Double/Jacquard ...)
    pub gauge: Option<String>,        // 针距
    pub diameter: Option<String>,     // 筒径
    pub needle_count: Option<u32>,    // 针数
    pub status: MachineStatus,        // 状态
    pub fabric: String,               // 当前布种
    pub client: String,               // 当前客户
    pub daily_rate: f64,              // 实测日产量
    pub avg_daily_rate: f64,          // 额定日产量 (兜底)
    pub remaining_quantity: f64,      // 当前任务剩余数量
    #[serde(default)]
    pub queue: Vec<PlanItem>,         // 排队计划
    #[serde(default)]
    pub revision: i32,                // 乐观锁：版本修订号
}

impl Machine {
    /// 机台类别
    pub fn category(&self) -> MachineCategory {
        MachineCategory::from_machine_type(&self.machine_type)
    }

    /// 当前任务的兜底日产量: 实测值有效时优先, 否则额定值
    ///
    /// 返回值可能 <= 0, 由 RateResolver 统一兜底
    pub fn fallback_rate(&self) -> f64 {
        if self.daily_rate.is_finite() && self.daily_rate > 0.0 {
            self.daily_rate
        } else if self.avg_daily_rate.is_finite() {
            self.avg_daily_rate
        } else {
            0.0
        }
    }

    /// 当前任务剩余数量 (非法值视为 0)
    pub fn current_remaining(&self) -> f64 {
        if self.remaining_quantity.is_finite() && self.remaining_quantity > 0.0 {
            self.remaining_quantity
        } else {
            0.0
        }
    }

    /// 是否正在生产当前布种 (状态为运行中, 或当前任务仍有剩余)
    pub fn is_actively_working(&self) -> bool {
        !self.fabric.trim().is_empty()
            && (self.status.is_running() || self.current_remaining() > 0.0)
    }

    /// 队列中最后一个生产条目的布种
    pub fn last_queued_fabric(&self) -> Option<&str> {
        self.queue
            .iter()
            .rev()
            .find(|item| item.is_production() && !item.fabric.trim().is_empty())
            .map(|item| item.fabric.as_str())
    }

    /// 最后排定的布种: 队列末尾生产条目, 否则当前布种
    pub fn last_scheduled_fabric(&self) -> Option<&str> {
        self.last_queued_fabric().or_else(|| {
            let current = self.fabric.trim();
            if current.is_empty() {
                None
            } else {
                Some(self.fabric.as_str())
            }
        })
    }

}
