// ==========================================
// 针织排产系统 - 订单领域模型
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Order - 客户订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,          // 订单ID
    pub customer: String,          // 客户
    pub fabric: String,            // 布种
    pub required_quantity: f64,    // 订单数量
    pub remaining_quantity: f64,   // 未排数量
    pub reference: Option<String>, // 外部参考号
}

impl Order {
    /// 待排数量: 未排数量有效时优先, 否则订单数量
    pub fn schedulable_quantity(&self) -> f64 {
        if self.remaining_quantity.is_finite() && self.remaining_quantity > 0.0 {
            self.remaining_quantity
        } else if self.required_quantity.is_finite() && self.required_quantity > 0.0 {
            self.required_quantity
        } else {
            0.0
        }
    }

    /// 写入计划条目的追溯号: reference 优先, 否则 order_id
    pub fn trace_reference(&self) -> String {
        match &self.reference {
            Some(r) if !r.trim().is_empty() => r.trim().to_string(),
            _ => self.order_id.clone(),
        }
    }
}
