// ==========================================
// 推荐原因展示
// ==========================================
// 评分项 → 可读原因文本; 只做格式化, 不参与计算
// ==========================================

use super::{ScoreComponent, ScoreKind};

/// 格式化单个评分项
///
/// # 参数
/// - days_until_free: 空闲天数 (仅 Availability 使用)
pub fn describe_component(component: &ScoreComponent, days_until_free: i64) -> String {
    let label = match component.kind {
        ScoreKind::ProvenHistory => "proven history".to_string(),
        ScoreKind::GroupMatch => "group match (same machine type as proven history)".to_string(),
        ScoreKind::NotInHistory => "not in proven history".to_string(),
        ScoreKind::SpecMismatch => "spec mismatch (gauge/diameter)".to_string(),
        ScoreKind::Availability => {
            if days_until_free <= 0 {
                "available now".to_string()
            } else {
                format!("free in {} days", days_until_free)
            }
        }
        ScoreKind::CurrentFabricMatch => "same fabric running now".to_string(),
        ScoreKind::LastQueuedFabricMatch => "same fabric at end of queue".to_string(),
        ScoreKind::ImmediateContinuity => "continues current job".to_string(),
        ScoreKind::SameClient => "same client".to_string(),
        ScoreKind::MachineUnavailable => "machine out of service".to_string(),
    };

    format!("{} ({:+})", label, component.points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_labels() {
        let c = ScoreComponent { kind: ScoreKind::Availability, points: 50 };
        assert_eq!(describe_component(&c, 0), "available now (+50)");

        let c = ScoreComponent { kind: ScoreKind::Availability, points: 35 };
        assert_eq!(describe_component(&c, 3), "free in 3 days (+35)");
    }

    #[test]
    fn test_negative_points_sign() {
        let c = ScoreComponent { kind: ScoreKind::NotInHistory, points: -2000 };
        assert_eq!(describe_component(&c, 0), "not in proven history (-2000)");
    }
}
