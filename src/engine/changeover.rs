// ==========================================
// 针织排产系统 - 换品种规则
// ==========================================
// 规则: 相邻两个生产任务布种不同 → 必须插入换品种时间
// 天数: 单面 2 天; 双面/提花 4 天; 未识别类别 2 天 (均可配置)
// 共用方: ScheduleChainer (插单) / RecommendationEngine (空闲天数)
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::machine::Machine;
use crate::domain::types::MachineCategory;
use crate::engine::fabric_matcher::FabricMatcher;

#[derive(Debug, Clone, Copy)]
pub struct ChangeoverRule {
    single: i64,
    double: i64,
    jacquard: i64,
    unknown: i64,
}

impl ChangeoverRule {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            single: config.changeover_days(MachineCategory::SingleJersey),
            double: config.changeover_days(MachineCategory::DoubleJersey),
            jacquard: config.changeover_days(MachineCategory::Jacquard),
            unknown: config.changeover_days(MachineCategory::Unknown),
        }
    }

    /// 按类别取换品种天数
    pub fn days_for(&self, category: MachineCategory) -> i64 {
        match category {
            MachineCategory::SingleJersey => self.single,
            MachineCategory::DoubleJersey => self.double,
            MachineCategory::Jacquard => self.jacquard,
            MachineCategory::Unknown => self.unknown,
        }
    }

    /// 按机台取换品种天数
    pub fn days_for_machine(&self, machine: &Machine) -> i64 {
        self.days_for(machine.category())
    }

    /// 是否需要换品种
    ///
    /// 前序布种缺失 (空机/队首) 或后续布种为空 → 不需要
    pub fn required(previous_fabric: Option<&str>, next_fabric: &str) -> bool {
        if FabricMatcher::normalize(next_fabric).is_empty() {
            return false;
        }
        match previous_fabric {
            Some(prev) if !FabricMatcher::normalize(prev).is_empty() => {
                !FabricMatcher::same_name(prev, next_fabric)
            }
            _ => false,
        }
    }

    /// 需要换品种时返回天数
    pub fn days_between(
        &self,
        machine: &Machine,
        previous_fabric: Option<&str>,
        next_fabric: &str,
    ) -> Option<i64> {
        if Self::required(previous_fabric, next_fabric) {
            Some(self.days_for_machine(machine))
        } else {
            None
        }
    }
}

impl Default for ChangeoverRule {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(ChangeoverRule::required(Some("Pique"), "Rib"));
        assert!(!ChangeoverRule::required(Some(" pique"), "PIQUE"));
        assert!(!ChangeoverRule::required(None, "Rib"));
        assert!(!ChangeoverRule::required(Some("  "), "Rib"));
        assert!(!ChangeoverRule::required(Some("Rib"), ""));
    }

    #[test]
    fn test_days_for_category() {
        let rule = ChangeoverRule::default();
        assert_eq!(rule.days_for(MachineCategory::SingleJersey), 2);
        assert_eq!(rule.days_for(MachineCategory::DoubleJersey), 4);
        assert_eq!(rule.days_for(MachineCategory::Jacquard), 4);
        assert_eq!(rule.days_for(MachineCategory::Unknown), 2);
    }
}
