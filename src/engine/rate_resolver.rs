// ==========================================
// 针织排产系统 - 日产量解析
// ==========================================
// 优先级: 机台专属覆写 → 布种默认日产量 → 调用方兜底 → 全局默认
// 红线: 永不返回 <= 0 的日产量; 无副作用、无 I/O
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::fabric::FabricDefinition;
use crate::domain::plan::MAX_PLAN_DAYS;
use crate::engine::fabric_matcher::FabricMatcher;

/// 非法数值 (NaN / 无穷 / 负数) 视为 0
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// 数量 → 天数
///
/// # 规则
/// - quantity <= 0 → 0
/// - 否则 max(1, ceil(quantity / rate)), rate 已保证 > 0
/// - 上限 MAX_PLAN_DAYS
pub fn days_for_quantity(quantity: f64, rate: f64) -> i64 {
    let quantity = sanitize(quantity);
    if quantity <= 0.0 {
        return 0;
    }
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    clamp_days((quantity / rate).ceil()).max(1)
}

/// 浮点天数 → [0, MAX_PLAN_DAYS] (NaN → 0, 无穷 → 上限)
pub fn clamp_days(days: f64) -> i64 {
    if days.is_nan() || days <= 0.0 {
        0
    } else if days >= MAX_PLAN_DAYS as f64 {
        MAX_PLAN_DAYS
    } else {
        days as i64
    }
}

// ==========================================
// RateResolver - 日产量解析器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct RateResolver {
    default_rate: f64,
}

impl RateResolver {
    pub fn new(default_rate: f64) -> Self {
        let default_rate = if default_rate.is_finite() && default_rate > 0.0 {
            default_rate
        } else {
            100.0
        };
        Self { default_rate }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.safe_default_rate())
    }

    /// 全局兜底日产量
    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    /// 解析日产量（按布种名称）
    ///
    /// # 参数
    /// - fabric_name: 布种名称 (自由文本)
    /// - machine_id: 机台ID (用于查找专属覆写)
    /// - fabrics: 布种目录
    /// - fallback_rate: 调用方兜底 (<= 0 时使用全局默认)
    pub fn resolve_rate(
        &self,
        fabric_name: &str,
        machine_id: &str,
        fabrics: &[FabricDefinition],
        fallback_rate: f64,
    ) -> f64 {
        let definition = FabricMatcher::find(fabric_name, fabrics);
        self.resolve_for_definition(definition, machine_id, fallback_rate)
    }

    /// 解析日产量（已解析的布种定义）
    pub fn resolve_for_definition(
        &self,
        definition: Option<&FabricDefinition>,
        machine_id: &str,
        fallback_rate: f64,
    ) -> f64 {
        let fallback = self.safe_fallback(fallback_rate);

        let Some(def) = definition else {
            return fallback;
        };

        if let Some(rate) = def.machine_rate_overrides.get(machine_id.trim()) {
            if rate.is_finite() && *rate > 0.0 {
                return *rate;
            }
        }

        match def.default_daily_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate,
            _ => fallback,
        }
    }

    fn safe_fallback(&self, fallback_rate: f64) -> f64 {
        if fallback_rate.is_finite() && fallback_rate > 0.0 {
            fallback_rate
        } else {
            self.default_rate
        }
    }
}

impl Default for RateResolver {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fabric_with_rates(default_rate: Option<f64>, overrides: &[(&str, f64)]) -> FabricDefinition {
        FabricDefinition {
            fabric_id: "F1".to_string(),
            name: "Pique".to_string(),
            short_name: None,
            default_daily_rate: default_rate,
            machine_rate_overrides: overrides
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            compatible_machines: vec![],
            specs: None,
        }
    }

    #[test]
    fn test_override_beats_default() {
        let fabrics = vec![fabric_with_rates(Some(80.0), &[("M", 120.0)])];
        let resolver = RateResolver::default();
        assert_eq!(resolver.resolve_rate("Pique", "M", &fabrics, 50.0), 120.0);
        assert_eq!(resolver.resolve_rate("Pique", "N", &fabrics, 50.0), 80.0);
    }

    #[test]
    fn test_non_positive_override_ignored() {
        let fabrics = vec![fabric_with_rates(Some(80.0), &[("M", 0.0)])];
        let resolver = RateResolver::default();
        assert_eq!(resolver.resolve_rate("pique", "M", &fabrics, 50.0), 80.0);
    }

    #[test]
    fn test_fallback_when_no_rates() {
        let fabrics = vec![fabric_with_rates(None, &[])];
        let resolver = RateResolver::default();
        assert_eq!(resolver.resolve_rate("Pique", "M", &fabrics, 65.0), 65.0);
        assert_eq!(resolver.resolve_rate("Unknown", "M", &fabrics, 65.0), 65.0);
    }

    #[test]
    fn test_invalid_fallback_uses_global_default() {
        let resolver = RateResolver::default();
        assert_eq!(resolver.resolve_rate("Unknown", "M", &[], 0.0), 100.0);
        assert_eq!(resolver.resolve_rate("Unknown", "M", &[], f64::NAN), 100.0);
        assert_eq!(RateResolver::new(-5.0).default_rate(), 100.0);
    }

    #[test]
    fn test_days_for_quantity() {
        assert_eq!(days_for_quantity(900.0, 150.0), 6);
        assert_eq!(days_for_quantity(901.0, 150.0), 7);
        assert_eq!(days_for_quantity(1.0, 150.0), 1);
        assert_eq!(days_for_quantity(0.0, 150.0), 0);
        assert_eq!(days_for_quantity(f64::NAN, 150.0), 0);
        assert_eq!(days_for_quantity(10.0, 0.0), 10);
    }

    #[test]
    fn test_days_for_huge_quantity_capped() {
        assert_eq!(days_for_quantity(1e12, 100.0), MAX_PLAN_DAYS);
        assert_eq!(days_for_quantity(f64::MAX, 1e-300), MAX_PLAN_DAYS);
        assert_eq!(clamp_days(f64::INFINITY), MAX_PLAN_DAYS);
        assert_eq!(clamp_days(f64::NAN), 0);
    }
}
