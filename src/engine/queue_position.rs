// ==========================================
// 针织排产系统 - 排队位置计算器
// ==========================================
// 职责: 同一产能分组内按建单日期排序, 给出排队位置
// 输入: 批次快照 + 目标批次
// 输出: QueueInfo (只读展示, 不持久化)
// ==========================================
// 规则:
// - 按 capacity_key 分组, formation_date 升序 (缺失排最后, 同日保持原顺序)
// - 组内不足 2 个批次 / 未找到目标 / 分组键为空 → None
// - finished_before: 前方批次中工序已越过参考工序的数量
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::job::{ProductionJob, QueueInfo};
use crate::domain::types::WorkflowStage;
use tracing::instrument;

#[derive(Debug, Clone, Copy)]
pub struct QueuePositionCalculator {
    reference_stage: WorkflowStage,
}

impl QueuePositionCalculator {
    pub fn new(reference_stage: WorkflowStage) -> Self {
        Self { reference_stage }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.queue_reference_stage)
    }

    pub fn reference_stage(&self) -> WorkflowStage {
        self.reference_stage
    }

    /// 计算批次排队位置
    ///
    /// # 参数
    /// - jobs: 全部批次快照 (可含其他分组)
    /// - job_id: 目标批次ID
    #[instrument(skip(self, jobs), fields(job_count = jobs.len()))]
    pub fn queue_info(&self, jobs: &[ProductionJob], job_id: &str) -> Option<QueueInfo> {
        let target = jobs.iter().find(|j| j.job_id == job_id)?;
        let key = target.capacity_key.trim();
        if key.is_empty() {
            return None;
        }

        let mut group: Vec<&ProductionJob> = jobs
            .iter()
            .filter(|j| j.capacity_key.trim() == key)
            .collect();

        let total = group.len();
        if total <= 1 {
            return None;
        }

        // 缺失日期排最后; sort_by_key 为稳定排序
        group.sort_by_key(|j| (j.formation_date.is_none(), j.formation_date));

        let index = group.iter().position(|j| j.job_id == job_id)?;
        let finished_before = group[..index]
            .iter()
            .filter(|j| j.stage.index() > self.reference_stage.index())
            .count();

        Some(QueueInfo {
            position: index + 1,
            total,
            finished_before,
            still_ahead_count: index - finished_before,
        })
    }
}

impl Default for QueuePositionCalculator {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn job(id: &str, key: &str, day: Option<u32>, stage: WorkflowStage) -> ProductionJob {
        ProductionJob {
            job_id: id.to_string(),
            capacity_key: key.to_string(),
            formation_date: day.map(|d| NaiveDate::from_ymd_opt(2026, 5, d).unwrap()),
            stage,
        }
    }

    #[test]
    fn test_middle_job_position() {
        let jobs = vec![
            job("J3", "M1", Some(3), WorkflowStage::Formed),
            job("J1", "M1", Some(1), WorkflowStage::Formed),
            job("J2", "M1", Some(2), WorkflowStage::Formed),
        ];

        let info = QueuePositionCalculator::default().queue_info(&jobs, "J2").unwrap();
        assert_eq!(info.position, 2);
        assert_eq!(info.total, 3);
        assert_eq!(info.finished_before, 0);
        assert_eq!(info.still_ahead_count, 1);
    }

    #[test]
    fn test_finished_before_uses_reference_stage() {
        let jobs = vec![
            job("J1", "M1", Some(1), WorkflowStage::Finishing),
            job("J2", "M1", Some(2), WorkflowStage::Dyeing),
            job("J3", "M1", Some(3), WorkflowStage::Delivered),
            job("J4", "M1", Some(4), WorkflowStage::Knitting),
        ];

        let info = QueuePositionCalculator::default().queue_info(&jobs, "J4").unwrap();
        // Dyeing 本身不算越过
        assert_eq!(info.finished_before, 2);
        assert_eq!(info.still_ahead_count, 1);

        let strict = QueuePositionCalculator::new(WorkflowStage::Knitting);
        let info = strict.queue_info(&jobs, "J4").unwrap();
        assert_eq!(info.finished_before, 3);
        assert_eq!(info.still_ahead_count, 0);
    }

    #[test]
    fn test_missing_date_sorts_last_and_ties_are_stable() {
        let jobs = vec![
            job("J0", "M1", None, WorkflowStage::Formed),
            job("JA", "M1", Some(5), WorkflowStage::Formed),
            job("JB", "M1", Some(5), WorkflowStage::Formed),
        ];
        let calc = QueuePositionCalculator::default();

        assert_eq!(calc.queue_info(&jobs, "J0").unwrap().position, 3);
        assert_eq!(calc.queue_info(&jobs, "JA").unwrap().position, 1);
        assert_eq!(calc.queue_info(&jobs, "JB").unwrap().position, 2);
    }

    #[test]
    fn test_none_cases() {
        let jobs = vec![
            job("J1", "M1", Some(1), WorkflowStage::Formed),
            job("J2", "M2", Some(2), WorkflowStage::Formed),
            job("J3", " ", Some(3), WorkflowStage::Formed),
            job("J4", "", Some(4), WorkflowStage::Formed),
        ];
        let calc = QueuePositionCalculator::default();

        // 组内仅 1 个
        assert!(calc.queue_info(&jobs, "J1").is_none());
        // 分组键为空
        assert!(calc.queue_info(&jobs, "J3").is_none());
        // 未找到
        assert!(calc.queue_info(&jobs, "missing").is_none());
    }

    #[test]
    fn test_other_groups_ignored() {
        let jobs = vec![
            job("A1", "M1", Some(1), WorkflowStage::Formed),
            job("B1", "M2", Some(1), WorkflowStage::Formed),
            job("A2", "M1", Some(9), WorkflowStage::Formed),
            job("B2", "M2", Some(2), WorkflowStage::Formed),
            job("B3", "M2", Some(3), WorkflowStage::Formed),
        ];

        let info = QueuePositionCalculator::default().queue_info(&jobs, "A2").unwrap();
        assert_eq!(info.position, 2);
        assert_eq!(info.total, 2);
    }
}
