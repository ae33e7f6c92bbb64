// ==========================================
// 针织排产系统 - 排程链计算器
// ==========================================
// 职责: 按队列顺序链式计算每个计划条目的开始/结束日期
// 输入: 机台当前任务 + 队列 + 布种目录 + 今天
// 输出: 新队列 (只改写 start_date / end_date / days / daily_rate)
// ==========================================
// 不变式:
// - item[i+1].start_date == item[i].end_date
// - 生产条目 quantity > 0 → days >= 1; quantity == 0 → days == 0
// - 换品种条目 days >= 1
// - 单项 days <= MAX_PLAN_DAYS; 日期越界时停在 NaiveDate::MAX
// 红线: 不读写数据库; 不 panic; 不除零
// ==========================================

use crate::config::SchedulingConfig;
use crate::domain::fabric::FabricDefinition;
use crate::domain::machine::Machine;
use crate::domain::order::Order;
use crate::domain::plan::{add_days, PlanItem, MAX_PLAN_DAYS};
use crate::engine::changeover::ChangeoverRule;
use crate::engine::rate_resolver::{days_for_quantity, sanitize, RateResolver};
use chrono::NaiveDate;
use tracing::instrument;

/// 插单结果
#[derive(Debug, Clone)]
pub struct InsertionResult {
    pub queue: Vec<PlanItem>,               // 链计算后的完整队列
    pub position: usize,                    // 实际插入位置 (已截断到队列长度)
    pub production_item_id: String,         // 新生产条目ID
    pub changeover_item_id: Option<String>, // 新换品种条目ID (如有)
}

// ==========================================
// ScheduleChainer - 排程链计算器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ScheduleChainer {
    rates: RateResolver,
    changeover: ChangeoverRule,
}

impl ScheduleChainer {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            rates: RateResolver::from_config(config),
            changeover: ChangeoverRule::from_config(config),
        }
    }

    /// 当前任务的日产量
    pub fn current_job_rate(&self, machine: &Machine, fabrics: &[FabricDefinition]) -> f64 {
        self.rates.resolve_rate(
            &machine.fabric,
            &machine.machine_id,
            fabrics,
            machine.fallback_rate(),
        )
    }

    /// 队列起点: today + ceil(当前剩余 / 当前日产量)
    pub fn cursor_date(
        &self,
        machine: &Machine,
        fabrics: &[FabricDefinition],
        today: NaiveDate,
    ) -> NaiveDate {
        let remaining = machine.current_remaining();
        if remaining <= 0.0 {
            return today;
        }
        let rate = self.current_job_rate(machine, fabrics);
        add_days(today, days_for_quantity(remaining, rate))
    }

    /// 重新链式计算整个队列
    ///
    /// # 规则
    /// 1. 起点 = cursor_date
    /// 2. 生产条目: daily_rate 经 RateResolver 解析 (兜底: 条目原日产量 → 机台日产量),
    ///    days = ceil(quantity / daily_rate)
    /// 3. 换品种条目: days = max(1, 原天数), 与数量无关
    /// 4. end_date = start_date + days, 下一条目从 end_date 开始
    ///
    /// 非法数量 (NaN / 负数) 按 0 写回
    #[instrument(skip(self, queue, machine, fabrics), fields(
        machine_id = %machine.machine_id,
        queue_len = queue.len()
    ))]
    pub fn rechain(
        &self,
        queue: &[PlanItem],
        machine: &Machine,
        fabrics: &[FabricDefinition],
        today: NaiveDate,
    ) -> Vec<PlanItem> {
        let mut cursor = self.cursor_date(machine, fabrics, today);
        let machine_fallback = machine.fallback_rate();

        let chained: Vec<PlanItem> = queue
            .iter()
            .map(|original| {
                let mut item = original.clone();
                item.start_date = cursor;

                if item.is_production() {
                    item.quantity = sanitize(item.quantity);
                    item.remaining_quantity = sanitize(item.remaining_quantity);
                    let own_rate = sanitize(item.daily_rate);
                    let fallback = if own_rate > 0.0 { own_rate } else { machine_fallback };
                    item.daily_rate = self.rates.resolve_rate(
                        &item.fabric,
                        &machine.machine_id,
                        fabrics,
                        fallback,
                    );
                    item.days = days_for_quantity(item.quantity, item.daily_rate);
                } else {
                    item.days = item.days.clamp(1, MAX_PLAN_DAYS);
                }

                item.end_date = add_days(item.start_date, item.days);
                cursor = item.end_date;
                item
            })
            .collect();

        tracing::debug!(
            cursor_end = %cursor,
            "排程链计算完成"
        );
        chained
    }

    /// 插入位置之前的布种
    ///
    /// # 规则
    /// - queue[..position] 中最后一个生产条目的布种
    /// - 没有时: 机台正在生产 → 当前布种; 否则 None
    pub fn preceding_fabric(machine: &Machine, position: usize) -> Option<&str> {
        let end = position.min(machine.queue.len());
        machine.queue[..end]
            .iter()
            .rev()
            .find(|item| item.is_production() && !item.fabric.trim().is_empty())
            .map(|item| item.fabric.as_str())
            .or_else(|| {
                if machine.is_actively_working() {
                    Some(machine.fabric.as_str())
                } else {
                    None
                }
            })
    }

    /// 在指定位置插入订单 (必要时前置换品种条目) 并重新链计算
    ///
    /// 插入后对整条队列做换品种对齐, 插入点之后不再需要的换品种条目被移除
    ///
    /// # 参数
    /// - position: 插入位置 (超出队列长度时追加到末尾)
    /// - quantity: 计划数量 (None → 订单待排数量)
    pub fn insert_order(
        &self,
        machine: &Machine,
        order: &Order,
        position: usize,
        quantity: Option<f64>,
        fabrics: &[FabricDefinition],
        today: NaiveDate,
    ) -> InsertionResult {
        let position = position.min(machine.queue.len());
        let quantity = quantity
            .map(sanitize)
            .unwrap_or_else(|| order.schedulable_quantity());
        let reference = Some(order.trace_reference());

        let production = PlanItem::production(
            &order.fabric,
            quantity,
            &order.customer,
            reference.clone(),
            today,
        );
        let production_item_id = production.item_id.clone();

        let previous = Self::preceding_fabric(machine, position);
        let changeover = self
            .changeover
            .days_between(machine, previous, &order.fabric)
            .map(|days| {
                PlanItem::changeover(
                    days,
                    previous.unwrap_or_default(),
                    &order.fabric,
                    reference.clone(),
                    today,
                )
            });

        let mut queue = machine.queue.clone();
        let mut block = Vec::with_capacity(2);
        block.extend(changeover);
        block.push(production);
        queue.splice(position..position, block);

        let queue = self.reconcile_changeovers(machine, queue, today);
        let changeover_item_id = queue
            .iter()
            .position(|item| item.item_id == production_item_id)
            .and_then(|index| index.checked_sub(1))
            .map(|index| &queue[index])
            .filter(|item| item.is_changeover())
            .map(|item| item.item_id.clone());

        tracing::info!(
            machine_id = %machine.machine_id,
            order_id = %order.order_id,
            position,
            changeover = changeover_item_id.is_some(),
            "插单"
        );

        InsertionResult {
            queue: self.rechain(&queue, machine, fabrics, today),
            position,
            production_item_id,
            changeover_item_id,
        }
    }

    /// 删除条目 (完工或人工删除) 并重新链计算
    ///
    /// 删除后对换品种条目做一次对齐 (见 reconcile_changeovers)
    ///
    /// # 返回
    /// - None: 条目不存在
    pub fn remove_item(
        &self,
        machine: &Machine,
        item_id: &str,
        fabrics: &[FabricDefinition],
        today: NaiveDate,
    ) -> Option<Vec<PlanItem>> {
        let index = machine.queue.iter().position(|i| i.item_id == item_id)?;
        let mut queue = machine.queue.clone();
        queue.remove(index);

        let queue = self.reconcile_changeovers(machine, queue, today);
        Some(self.rechain(&queue, machine, fabrics, today))
    }

    /// 移动条目到新位置 (人工调序) 并重新链计算
    ///
    /// new_position 按移除该条目后的队列计算, 超出时追加到末尾
    pub fn move_item(
        &self,
        machine: &Machine,
        item_id: &str,
        new_position: usize,
        fabrics: &[FabricDefinition],
        today: NaiveDate,
    ) -> Option<Vec<PlanItem>> {
        let index = machine.queue.iter().position(|i| i.item_id == item_id)?;
        let mut queue = machine.queue.clone();
        let item = queue.remove(index);
        let target = new_position.min(queue.len());
        queue.insert(target, item);

        let queue = self.reconcile_changeovers(machine, queue, today);
        Some(self.rechain(&queue, machine, fabrics, today))
    }

    /// 换品种条目对齐
    ///
    /// # 规则
    /// - 换品种条目仅在“下一条为生产条目且布种与前序不同”时保留
    /// - 生产条目与前序布种不同且前面没有换品种条目 → 补一条
    pub fn reconcile_changeovers(
        &self,
        machine: &Machine,
        queue: Vec<PlanItem>,
        today: NaiveDate,
    ) -> Vec<PlanItem> {
        let mut previous: Option<String> = if machine.is_actively_working() {
            Some(machine.fabric.clone())
        } else {
            None
        };
        let mut result: Vec<PlanItem> = Vec::with_capacity(queue.len());

        for (index, item) in queue.iter().enumerate() {
            if item.is_changeover() {
                let keep = match queue.get(index + 1) {
                    Some(next) if next.is_production() => {
                        ChangeoverRule::required(previous.as_deref(), &next.fabric)
                    }
                    _ => false,
                };
                if keep {
                    result.push(item.clone());
                } else {
                    tracing::debug!(item_id = %item.item_id, "移除多余换品种条目");
                }
                continue;
            }

            let needs_changeover = ChangeoverRule::required(previous.as_deref(), &item.fabric);
            let has_changeover = result.last().map(|p| p.is_changeover()).unwrap_or(false);
            if needs_changeover && !has_changeover {
                result.push(PlanItem::changeover(
                    self.changeover.days_for_machine(machine),
                    previous.as_deref().unwrap_or_default(),
                    &item.fabric,
                    item.order_reference.clone(),
                    today,
                ));
            }

            if !item.fabric.trim().is_empty() {
                previous = Some(item.fabric.clone());
            }
            result.push(item.clone());
        }

        result
    }
}

impl Default for ScheduleChainer {
    fn default() -> Self {
        Self::new(&SchedulingConfig::default())
    }
}
