// ==========================================
// 针织排产系统 - 机台推荐引擎
// ==========================================
// 职责: 对订单计算每台机台的兼容性判定 + 分数 + 原因, 按分数降序
// 输入: 订单 + 机台列表 + 布种目录 + 今天
// 输出: Vec<Recommendation> (不持久化)
// ==========================================
// 评分步骤:
// a. 履历: 履历机台 +100; 同类别 +50 (暂定兼容); 否则不兼容 (-2000)
// b. 规格: 针距 + 筒径须匹配任一允许规格, 否则不兼容 (<= -1000)
// c. 不兼容 → 跳过加分项, 仍保留在结果中供人工强制指定
// d. 空闲度: 50 - min(空闲天数 × 5, 70)
// e. 连续性: 当前布种 +80 / 队尾布种 +60; 空队列且当前布种一致 +20; 同客户 +30
// f. 停用/维修机台扣分
// 红线: 不抛错, 不溢出; 分数计算 (ScoreComponent) 与原因展示 (reasons) 分离
// ==========================================

mod context;
mod reasons;


pub use context::{axis_matches, CompatibilityContext};
pub use reasons::describe_component;

use crate::config::{ScoreWeights, SchedulingConfig};
use crate::domain::fabric::FabricDefinition;
use crate::domain::machine::Machine;
use crate::domain::order::Order;
use crate::domain::plan::{add_days, MAX_PLAN_DAYS};
use crate::engine::changeover::ChangeoverRule;
use crate::engine::fabric_matcher::FabricMatcher;
use crate::engine::rate_resolver::{clamp_days, sanitize, RateResolver};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// 评分项
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreKind {
    ProvenHistory,         // 履历机台
    GroupMatch,            // 同类别机台
    NotInHistory,          // 不在履历
    SpecMismatch,          // 规格不符
    Availability,          // 空闲度
    CurrentFabricMatch,    // 当前布种一致
    LastQueuedFabricMatch, // 队尾布种一致
    ImmediateContinuity,   // 紧接当前任务
    SameClient,            // 同一客户
    MachineUnavailable,    // 停用/维修
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub kind: ScoreKind,
    pub points: i64,
}

// ==========================================
// Recommendation - 推荐结果 (不持久化)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub machine_id: String,
    pub machine_name: String,
    pub score: i64,
    pub components: Vec<ScoreComponent>,
    pub reasons: Vec<String>,
    pub days_until_free: i64,
    pub projected_finish_date: NaiveDate,
    pub is_compatible: bool,
}

impl Recommendation {
    /// 是否含某评分项
    pub fn has(&self, kind: ScoreKind) -> bool {
        self.components.iter().any(|c| c.kind == kind)
    }
}

// ==========================================
// RecommendationEngine - 机台推荐引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    weights: ScoreWeights,
    rates: RateResolver,
    changeover: ChangeoverRule,
}

impl RecommendationEngine {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            rates: RateResolver::from_config(config),
            changeover: ChangeoverRule::from_config(config),
        }
    }

    /// 计算推荐列表 (按分数降序, 同分保持机台原顺序)
    ///
    /// # 参数
    /// - customer_name: 客户名 (None 或空 → 使用 order.customer)
    #[instrument(skip(self, order, machines, fabrics), fields(
        order_id = %order.order_id,
        fabric = %order.fabric,
        machine_count = machines.len()
    ))]
    pub fn recommend(
        &self,
        order: &Order,
        machines: &[Machine],
        fabrics: &[FabricDefinition],
        customer_name: Option<&str>,
        today: NaiveDate,
    ) -> Vec<Recommendation> {
        let definition = FabricMatcher::find(&order.fabric, fabrics);
        if definition.is_none() {
            tracing::debug!("布种不在目录中, 不施加履历/规格约束");
        }
        let context = CompatibilityContext::build(definition, machines);

        let customer = customer_name
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(order.customer.as_str());

        let mut recommendations: Vec<Recommendation> = machines
            .iter()
            .map(|machine| self.evaluate(&context, machine, order, fabrics, customer, today))
            .collect();

        recommendations.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(
            compatible = recommendations.iter().filter(|r| r.is_compatible).count(),
            "推荐计算完成"
        );
        recommendations
    }

    /// 默认选中: 排名第一且兼容
    pub fn auto_select(recommendations: &[Recommendation]) -> Option<&Recommendation> {
        recommendations.first().filter(|r| r.is_compatible)
    }

    /// 评估单台机台
    pub fn evaluate(
        &self,
        context: &CompatibilityContext,
        machine: &Machine,
        order: &Order,
        fabrics: &[FabricDefinition],
        customer: &str,
        today: NaiveDate,
    ) -> Recommendation {
        let w = &self.weights;
        let mut components: Vec<ScoreComponent> = Vec::new();
        let mut is_compatible = true;

        // === a. 履历 ===
        if context.has_history() {
            if context.is_proven(machine) {
                components.push(component(ScoreKind::ProvenHistory, w.proven_history));
            } else if context.in_history_group(machine) {
                components.push(component(ScoreKind::GroupMatch, w.group_match));
            } else {
                is_compatible = false;
                components.push(component(ScoreKind::NotInHistory, w.not_in_history));
            }
        }

        // === b. 规格 (仅在暂定兼容时) ===
        if is_compatible && !context.spec_allowed(machine) {
            is_compatible = false;
            let prior = total(&components);
            let forced = prior.min(w.spec_mismatch_ceiling);
            components.push(component(ScoreKind::SpecMismatch, forced.saturating_sub(prior)));
        }

        let days_until_free = self.days_until_free(machine, order, fabrics);
        let projected_finish_date = add_days(today, days_until_free);

        // === c/d/e/f. 兼容时才计算加分项 ===
        if is_compatible {
            components.push(component(
                ScoreKind::Availability,
                w.availability_base.saturating_sub(
                    days_until_free
                        .max(0)
                        .saturating_mul(w.availability_per_day)
                        .min(w.availability_max_penalty),
                ),
            ));
            self.push_continuity(&mut components, machine, order, customer);

            if machine.status.is_unavailable() {
                components.push(component(
                    ScoreKind::MachineUnavailable,
                    w.unavailable_penalty,
                ));
            }
        }

        let score = total(&components);
        let reasons = components
            .iter()
            .map(|c| describe_component(c, days_until_free))
            .collect();

        Recommendation {
            machine_id: machine.machine_id.clone(),
            machine_name: machine.name.clone(),
            score,
            components,
            reasons,
            days_until_free,
            projected_finish_date,
            is_compatible,
        }
    }

    /// 空闲天数
    ///
    /// # 规则
    /// - ceil(当前任务天数 + 队列各条目天数) (生产条目按 RateResolver 折算, 换品种条目取其天数)
    /// - 生产条目按计划数量 quantity 折算, 与 ScheduleChainer::rechain 一致
    /// - 最后排定布种与订单布种不同 → 再加换品种天数
    /// - 结果上限 MAX_PLAN_DAYS
    pub fn days_until_free(
        &self,
        machine: &Machine,
        order: &Order,
        fabrics: &[FabricDefinition],
    ) -> i64 {
        let machine_fallback = machine.fallback_rate();

        let current_rate = self.rates.resolve_rate(
            &machine.fabric,
            &machine.machine_id,
            fabrics,
            machine_fallback,
        );
        let mut total_days = machine.current_remaining() / current_rate;

        for item in &machine.queue {
            if item.is_production() {
                let own_rate = sanitize(item.daily_rate);
                let fallback = if own_rate > 0.0 { own_rate } else { machine_fallback };
                let rate =
                    self.rates
                        .resolve_rate(&item.fabric, &machine.machine_id, fabrics, fallback);
                total_days += sanitize(item.quantity) / rate;
            } else {
                total_days += item.days.clamp(1, MAX_PLAN_DAYS) as f64;
            }
        }

        let mut days = clamp_days(total_days.ceil());

        if let Some(changeover_days) =
            self.changeover
                .days_between(machine, machine.last_scheduled_fabric(), &order.fabric)
        {
            days = days.saturating_add(changeover_days);
        }

        days.min(MAX_PLAN_DAYS)
    }

    fn push_continuity(
        &self,
        components: &mut Vec<ScoreComponent>,
        machine: &Machine,
        order: &Order,
        customer: &str,
    ) {
        let w = &self.weights;
        let current_match = FabricMatcher::same_name(&machine.fabric, &order.fabric);

        if current_match {
            components.push(component(ScoreKind::CurrentFabricMatch, w.current_fabric_match));
        } else if machine
            .last_queued_fabric()
            .map(|f| FabricMatcher::same_name(f, &order.fabric))
            .unwrap_or(false)
        {
            components.push(component(
                ScoreKind::LastQueuedFabricMatch,
                w.last_queued_fabric_match,
            ));
        }

        if current_match && machine.queue.is_empty() {
            components.push(component(ScoreKind::ImmediateContinuity, w.immediate_continuity));
        }

        if FabricMatcher::same_name(&machine.client, customer) {
            components.push(component(ScoreKind::SameClient, w.same_client));
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(&SchedulingConfig::default())
    }
}

fn component(kind: ScoreKind, points: i64) -> ScoreComponent {
    ScoreComponent { kind, points }
}

fn total(components: &[ScoreComponent]) -> i64 {
    components
        .iter()
        .fold(0i64, |acc, c| acc.saturating_add(c.points))
}
