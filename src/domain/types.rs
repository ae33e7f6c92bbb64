// ==========================================
// 针织排产系统 - 领域类型定义
// ==========================================
// 职责: 机台状态、计划条目类型、机台类别、工序阶段
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 机台状态 (Machine Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Working,          // 生产中
    UnderOperation,   // 调试/上机中
    NoOrder,          // 无订单
    OutOfService,     // 停用
    UnderMaintenance, // 维修中
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MachineStatus {
    /// 从字符串解析状态（兼容空格/连字符/大小写写法）
    pub fn from_str(s: &str) -> Self {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match key.as_str() {
            "WORKING" => MachineStatus::Working,
            "UNDEROPERATION" => MachineStatus::UnderOperation,
            "OUTOFSERVICE" => MachineStatus::OutOfService,
            "UNDERMAINTENANCE" | "MAINTENANCE" => MachineStatus::UnderMaintenance,
            _ => MachineStatus::NoOrder, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineStatus::Working => "WORKING",
            MachineStatus::UnderOperation => "UNDER_OPERATION",
            MachineStatus::NoOrder => "NO_ORDER",
            MachineStatus::OutOfService => "OUT_OF_SERVICE",
            MachineStatus::UnderMaintenance => "UNDER_MAINTENANCE",
        }
    }

    /// 是否正在运行当前任务
    pub fn is_running(&self) -> bool {
        matches!(self, MachineStatus::Working | MachineStatus::UnderOperation)
    }

    /// 是否暂不可接单（停用/维修）
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            MachineStatus::OutOfService | MachineStatus::UnderMaintenance
        )
    }
}

// ==========================================
// 计划条目类型 (Plan Item Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanItemKind {
    Production, // 生产
    Changeover, // 换品种/调机
}

impl fmt::Display for PlanItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanItemKind::Production => write!(f, "PRODUCTION"),
            PlanItemKind::Changeover => write!(f, "CHANGEOVER"),
        }
    }
}

// ==========================================
// 机台类别 (Machine Category)
// ==========================================
// 由 machine_type 文本归类, 决定换品种天数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineCategory {
    SingleJersey, // 单面
    DoubleJersey, // 双面
    Jacquard,     // 提花
    Unknown,      // 未识别
}

impl MachineCategory {
    /// 从机台类型文本归类
    ///
    /// # 规则
    /// 1. 含 "jacquard" → Jacquard (优先, 提花机常写作 "Double Jacquard")
    /// 2. 含 "double" / "interlock" / "rib" → DoubleJersey
    /// 3. 含 "single" → SingleJersey
    /// 4. 其他 → Unknown
    pub fn from_machine_type(machine_type: &str) -> Self {
        let t = machine_type.trim().to_lowercase();
        if t.contains("jacquard") {
            MachineCategory::Jacquard
        } else if t.contains("double") || t.contains("interlock") || t.contains("rib") {
            MachineCategory::DoubleJersey
        } else if t.contains("single") {
            MachineCategory::SingleJersey
        } else {
            MachineCategory::Unknown
        }
    }
}

impl fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineCategory::SingleJersey => write!(f, "SINGLE_JERSEY"),
            MachineCategory::DoubleJersey => write!(f, "DOUBLE_JERSEY"),
            MachineCategory::Jacquard => write!(f, "JACQUARD"),
            MachineCategory::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ==========================================
// 工序阶段 (Workflow Stage)
// ==========================================
// 顺序: Formed < Knitting < RawInspection < Dyeing < Finishing < FinalInspection < Delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    Formed,          // 已建单
    Knitting,        // 织造
    RawInspection,   // 坯布检验
    Dyeing,          // 染色
    Finishing,       // 后整理
    FinalInspection, // 成品检验
    Delivered,       // 已交付
}

impl WorkflowStage {
    /// 阶段序号（从 0 开始）
    pub fn index(&self) -> usize {
        match self {
            WorkflowStage::Formed => 0,
            WorkflowStage::Knitting => 1,
            WorkflowStage::RawInspection => 2,
            WorkflowStage::Dyeing => 3,
            WorkflowStage::Finishing => 4,
            WorkflowStage::FinalInspection => 5,
            WorkflowStage::Delivered => 6,
        }
    }

    /// 从字符串解析阶段
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "KNITTING" => WorkflowStage::Knitting,
            "RAW_INSPECTION" => WorkflowStage::RawInspection,
            "DYEING" => WorkflowStage::Dyeing,
            "FINISHING" => WorkflowStage::Finishing,
            "FINAL_INSPECTION" => WorkflowStage::FinalInspection,
            "DELIVERED" => WorkflowStage::Delivered,
            _ => WorkflowStage::Formed,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkflowStage::Formed => "FORMED",
            WorkflowStage::Knitting => "KNITTING",
            WorkflowStage::RawInspection => "RAW_INSPECTION",
            WorkflowStage::Dyeing => "DYEING",
            WorkflowStage::Finishing => "FINISHING",
            WorkflowStage::FinalInspection => "FINAL_INSPECTION",
            WorkflowStage::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_category_from_type() {
        assert_eq!(
            MachineCategory::from_machine_type("Single Jersey"),
            MachineCategory::SingleJersey
        );
        assert_eq!(
            MachineCategory::from_machine_type("double"),
            MachineCategory::DoubleJersey
        );
        assert_eq!(
            MachineCategory::from_machine_type("Double Jacquard"),
            MachineCategory::Jacquard
        );
        assert_eq!(
            MachineCategory::from_machine_type("Fleece"),
            MachineCategory::Unknown
        );
    }

    #[test]
    fn test_machine_status_from_str() {
        assert_eq!(MachineStatus::from_str("Working"), MachineStatus::Working);
        assert_eq!(
            MachineStatus::from_str("under operation"),
            MachineStatus::UnderOperation
        );
        assert_eq!(
            MachineStatus::from_str("OUT_OF_SERVICE"),
            MachineStatus::OutOfService
        );
        assert_eq!(MachineStatus::from_str("???"), MachineStatus::NoOrder);
    }

    #[test]
    fn test_workflow_stage_order() {
        assert!(WorkflowStage::Finishing > WorkflowStage::Dyeing);
        assert_eq!(WorkflowStage::Dyeing.index(), 3);
        assert_eq!(
            WorkflowStage::from_str(WorkflowStage::FinalInspection.to_db_str()),
            WorkflowStage::FinalInspection
        );
    }
}
