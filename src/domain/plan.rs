// ==========================================
// 针织排产系统 - 计划条目领域模型
// ==========================================
// 红线: 日期只由排程链计算器改写, 不单独修改
// 不变式: 链计算后 item[i+1].start_date == item[i].end_date
// ==========================================

use crate::domain::types::PlanItemKind;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 单项工期上限 (天)
pub const MAX_PLAN_DAYS: i64 = 36_500;

/// 日期顺延, 超出日历范围时停在 NaiveDate::MAX
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let days = days.clamp(-MAX_PLAN_DAYS, MAX_PLAN_DAYS);
    date.checked_add_signed(Duration::days(days)).unwrap_or(NaiveDate::MAX)
}

// ==========================================
// PlanItem - 机台队列中的计划条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub item_id: String,                 // 条目ID (UUID)
    pub kind: PlanItemKind,              // 生产 / 换品种
    #[serde(default)]
    pub fabric: String,                  // 布种 (换品种条目为空)
    #[serde(default)]
    pub quantity: f64,                   // 计划数量 (kg)
    #[serde(default)]
    pub daily_rate: f64,                 // 日产量 (kg/天)
    #[serde(default)]
    pub days: i64,                       // 天数
    pub start_date: NaiveDate,           // 开始日期
    pub end_date: NaiveDate,             // 结束日期
    #[serde(default)]
    pub remaining_quantity: f64,         // 剩余数量
    #[serde(default)]
    pub client: String,                  // 客户
    #[serde(default)]
    pub order_reference: Option<String>, // 关联订单 (可追溯)
    #[serde(default)]
    pub notes: Option<String>,           // 备注
}

impl PlanItem {
    /// 创建生产条目（日期由链计算器回填）
    pub fn production(
        fabric: &str,
        quantity: f64,
        client: &str,
        order_reference: Option<String>,
        placeholder_date: NaiveDate,
    ) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            kind: PlanItemKind::Production,
            fabric: fabric.trim().to_string(),
            quantity,
            daily_rate: 0.0,
            days: 0,
            start_date: placeholder_date,
            end_date: placeholder_date,
            remaining_quantity: quantity,
            client: client.trim().to_string(),
            order_reference,
            notes: None,
        }
    }

    /// 创建换品种条目
    ///
    /// # 参数
    /// - days: 换品种天数 (由机台类别决定)
    /// - from_fabric / to_fabric: 仅用于备注
    pub fn changeover(
        days: i64,
        from_fabric: &str,
        to_fabric: &str,
        order_reference: Option<String>,
        placeholder_date: NaiveDate,
    ) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            kind: PlanItemKind::Changeover,
            fabric: String::new(),
            quantity: 0.0,
            daily_rate: 0.0,
            days,
            start_date: placeholder_date,
            end_date: placeholder_date,
            remaining_quantity: 0.0,
            client: String::new(),
            order_reference,
            notes: Some(format!("{} -> {}", from_fabric.trim(), to_fabric.trim())),
        }
    }

    /// 判断是否为生产条目
    pub fn is_production(&self) -> bool {
        self.kind == PlanItemKind::Production
    }

    /// 判断是否为换品种条目
    pub fn is_changeover(&self) -> bool {
        self.kind == PlanItemKind::Changeover
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_days_saturates_at_calendar_end() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(add_days(start, 3), NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(add_days(start, i64::MAX), add_days(start, MAX_PLAN_DAYS));
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }
}
