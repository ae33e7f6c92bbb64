// ==========================================
// 针织排产系统 - 布种名称解析
// ==========================================
// 职责: 自由文本布种名 → FabricDefinition 的唯一解析入口
// 红线: 模糊匹配只在此处发生, 评分/链计算只消费解析结果
// ==========================================
// 匹配规则 (按优先级):
// 1. name / short_name 忽略大小写完全相等
// 2. name / short_name 与查询互为子串 (忽略大小写, 空串不参与)
// 多条命中时取目录顺序中的第一条
// ==========================================

use crate::domain::fabric::FabricDefinition;

pub struct FabricMatcher;

impl FabricMatcher {
    /// 规范化: 去首尾空白 + 小写 + 折叠连续空白
    pub fn normalize(s: &str) -> String {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// 规范化比较 (两侧任一为空 → 不相等)
    pub fn same_name(a: &str, b: &str) -> bool {
        let a = Self::normalize(a);
        let b = Self::normalize(b);
        !a.is_empty() && a == b
    }

    /// 按名称查找布种定义
    pub fn find<'a>(name: &str, fabrics: &'a [FabricDefinition]) -> Option<&'a FabricDefinition> {
        let query = Self::normalize(name);
        if query.is_empty() {
            return None;
        }

        let exact = fabrics.iter().find(|def| {
            Self::candidate_names(def).any(|candidate| candidate == query)
        });
        if exact.is_some() {
            return exact;
        }

        fabrics.iter().find(|def| {
            Self::candidate_names(def)
                .any(|candidate| candidate.contains(&query) || query.contains(&candidate))
        })
    }

    fn candidate_names(def: &FabricDefinition) -> impl Iterator<Item = String> + '_ {
        std::iter::once(def.name.as_str())
            .chain(def.short_name.as_deref())
            .map(Self::normalize)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fabric(id: &str, name: &str, short: Option<&str>) -> FabricDefinition {
        FabricDefinition {
            fabric_id: id.to_string(),
            name: name.to_string(),
            short_name: short.map(|s| s.to_string()),
            ..FabricDefinition::default()
        }
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let fabrics = vec![
            fabric("F1", "Single Jersey Lycra", None),
            fabric("F2", "Jersey", None),
        ];
        let found = FabricMatcher::find("jersey", &fabrics).unwrap();
        assert_eq!(found.fabric_id, "F2");
    }

    #[test]
    fn test_short_name_and_substring() {
        let fabrics = vec![fabric("F1", "Pique Cotton 100%", Some("PQ"))];
        assert_eq!(FabricMatcher::find(" pq ", &fabrics).unwrap().fabric_id, "F1");
        assert_eq!(FabricMatcher::find("PIQUE", &fabrics).unwrap().fabric_id, "F1");
        assert!(FabricMatcher::find("Rib", &fabrics).is_none());
    }

    #[test]
    fn test_empty_query_never_matches() {
        let fabrics = vec![fabric("F1", "Pique", None)];
        assert!(FabricMatcher::find("   ", &fabrics).is_none());
        assert!(!FabricMatcher::same_name("", ""));
    }

    #[test]
    fn test_same_name_normalizes() {
        assert!(FabricMatcher::same_name("Single  Jersey ", "single jersey"));
        assert!(!FabricMatcher::same_name("Pique", "Rib"));
    }
}
