// ==========================================
// 兼容性上下文 (Compatibility Context)
// ==========================================
// 由订单布种一次性构建, 对每台机台复用
// - proven_machines: 生产履历中的机台名称 (规范化)
// - allowed_specs: 布种显式规格 + 履历机台自身的 (针距, 筒径)
// - history_groups: 履历机台的类型文本 (规范化), 用于同类别宽松匹配
// ==========================================

use crate::domain::fabric::{FabricDefinition, FabricSpec};
use crate::domain::machine::Machine;
use crate::engine::fabric_matcher::FabricMatcher;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct CompatibilityContext {
    pub fabric_id: Option<String>,
    pub proven_machines: HashSet<String>,
    pub allowed_specs: Vec<FabricSpec>,
    pub history_groups: HashSet<String>,
}

impl CompatibilityContext {
    /// 构建上下文
    ///
    /// 布种不在目录中 → 空上下文 (无履历/规格约束)
    pub fn build(
        definition: Option<&FabricDefinition>,
        machines: &[Machine],
    ) -> Self {
        let Some(def) = definition else {
            return Self::default();
        };

        let proven_machines: HashSet<String> = def
            .compatible_machines
            .iter()
            .map(|name| FabricMatcher::normalize(name))
            .filter(|name| !name.is_empty())
            .collect();

        let mut allowed_specs = Vec::new();
        if let Some(spec) = def.specs.as_ref().filter(|s| !s.is_empty()) {
            allowed_specs.push(spec.clone());
        }

        let mut history_groups = HashSet::new();
        for machine in machines.iter().filter(|m| is_proven(m, &proven_machines)) {
            let spec = FabricSpec {
                gauge: machine.gauge.clone(),
                diameter: machine.diameter.clone(),
            };
            if !spec.is_empty() && !allowed_specs.contains(&spec) {
                allowed_specs.push(spec);
            }

            let group = FabricMatcher::normalize(&machine.machine_type);
            if !group.is_empty() {
                history_groups.insert(group);
            }
        }

        Self {
            fabric_id: Some(def.fabric_id.clone()),
            proven_machines,
            allowed_specs,
            history_groups,
        }
    }

    /// 是否有生产履历
    pub fn has_history(&self) -> bool {
        !self.proven_machines.is_empty()
    }

    /// 机台是否在履历中 (名称或ID)
    pub fn is_proven(&self, machine: &Machine) -> bool {
        is_proven(machine, &self.proven_machines)
    }

    /// 机台类型是否与履历机台同组
    pub fn in_history_group(&self, machine: &Machine) -> bool {
        let group = FabricMatcher::normalize(&machine.machine_type);
        !group.is_empty() && self.history_groups.contains(&group)
    }

    /// 规格校验: 与任一允许规格的针距、筒径同时匹配
    ///
    /// 无允许规格 → 通过
    pub fn spec_allowed(&self, machine: &Machine) -> bool {
        if self.allowed_specs.is_empty() {
            return true;
        }
        self.allowed_specs.iter().any(|spec| {
            axis_matches(machine.gauge.as_deref(), spec.gauge.as_deref())
                && axis_matches(machine.diameter.as_deref(), spec.diameter.as_deref())
        })
    }
}

fn is_proven(machine: &Machine, proven: &HashSet<String>) -> bool {
    [machine.name.as_str(), machine.machine_id.as_str()]
        .iter()
        .map(|s| FabricMatcher::normalize(s))
        .any(|s| !s.is_empty() && proven.contains(&s))
}

/// 单轴匹配: 任一侧缺失视为通配; 数值可解析时按数值比较 ("24" == "24.0" == "24G")
pub fn axis_matches(machine_value: Option<&str>, allowed_value: Option<&str>) -> bool {
    let (Some(a), Some(b)) = (non_blank(machine_value), non_blank(allowed_value)) else {
        return true;
    };

    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => FabricMatcher::same_name(a, b),
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn numeric_value(s: &str) -> Option<f64> {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}
