// ==========================================
// 针织排产系统 - 布种定义领域模型
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// FabricSpec - 技术规格 (针距 + 筒径)
// ==========================================
// 任一轴缺失视为通配
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FabricSpec {
    pub gauge: Option<String>,
    pub diameter: Option<String>,
}

impl FabricSpec {
    pub fn new(gauge: Option<&str>, diameter: Option<&str>) -> Self {
        Self {
            gauge: gauge.map(|s| s.to_string()),
            diameter: diameter.map(|s| s.to_string()),
        }
    }

    /// 两轴均为空
    pub fn is_empty(&self) -> bool {
        blank(&self.gauge) && blank(&self.diameter)
    }
}

fn blank(v: &Option<String>) -> bool {
    v.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}

// ==========================================
// FabricDefinition - 布种定义
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FabricDefinition {
    pub fabric_id: String,                           // 布种ID
    pub name: String,                                // 名称
    #[serde(default)]
    pub short_name: Option<String>,                  // 简称
    #[serde(default)]
    pub default_daily_rate: Option<f64>,             // 默认日产量
    #[serde(default)]
    pub machine_rate_overrides: HashMap<String, f64>, // 机台ID → 日产量
    #[serde(default)]
    pub compatible_machines: Vec<String>,            // 生产履历 (机台名称)
    #[serde(default)]
    pub specs: Option<FabricSpec>,                   // 显式技术规格
}
