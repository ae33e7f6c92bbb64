// ==========================================
// 针织排产系统 - 引擎层
// ==========================================
// 职责: 产量解析 / 排程链计算 / 机台推荐 / 排队位置
// 红线: Engine 不拼 SQL, 不做 I/O; 调用方提供快照并负责持久化
// 红线: 推荐结果必须输出 reason
// ==========================================

pub mod changeover;
pub mod fabric_matcher;
pub mod queue_position;
pub mod rate_resolver;
pub mod recommendation;
pub mod schedule_chainer;

// 重导出核心引擎
pub use changeover::ChangeoverRule;
pub use fabric_matcher::FabricMatcher;
pub use queue_position::QueuePositionCalculator;
pub use rate_resolver::RateResolver;
pub use recommendation::{
    CompatibilityContext, Recommendation, RecommendationEngine, ScoreComponent, ScoreKind,
};
pub use schedule_chainer::{InsertionResult, ScheduleChainer};
