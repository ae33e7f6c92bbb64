// ==========================================
// 针织排产系统 - 排产 API
// ==========================================
// 职责: 读取快照 → 调用引擎 → 一次写入 (replace_queue 乐观锁)
// 红线: 不兼容机台默认拒绝, 需显式 allow_incompatible 才能强制指定
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, SchedulingConfig};
use crate::domain::machine::Machine;
use crate::domain::plan::PlanItem;
use crate::engine::recommendation::{Recommendation, RecommendationEngine};
use crate::engine::schedule_chainer::ScheduleChainer;
use crate::repository::{FabricRepository, MachineRepository, OrderRepository};

// ==========================================
// DTO 定义
// ==========================================

/// 指定机台排产请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleOrderRequest {
    pub order_id: String,
    pub machine_id: String,
    /// 插入位置 (None → 队尾)
    #[serde(default)]
    pub position: Option<usize>,
    /// 排产数量 (None → 订单待排数量)
    #[serde(default)]
    pub quantity: Option<f64>,
    /// 客户名 (None → 订单客户)
    #[serde(default)]
    pub customer_name: Option<String>,
    /// 允许强制指定不兼容机台
    #[serde(default)]
    pub allow_incompatible: bool,
    /// 读取快照时的 revision (None → 使用本次读取的 revision)
    #[serde(default)]
    pub expected_revision: Option<i32>,
}

/// 排产结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOrderResponse {
    pub machine_id: String,
    pub revision: i32,
    pub position: usize,
    pub production_item_id: String,
    pub changeover_item_id: Option<String>,
    pub recommendation: Recommendation,
    pub queue: Vec<PlanItem>,
}

/// 队列变更结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueUpdateResponse {
    pub machine_id: String,
    pub revision: i32,
    pub queue: Vec<PlanItem>,
}

// ==========================================
// SchedulingApi
// ==========================================
pub struct SchedulingApi {
    machine_repo: Arc<MachineRepository>,
    order_repo: Arc<OrderRepository>,
    fabric_repo: Arc<FabricRepository>,
    config_manager: Arc<ConfigManager>,
}

impl SchedulingApi {
    pub fn new(
        machine_repo: Arc<MachineRepository>,
        order_repo: Arc<OrderRepository>,
        fabric_repo: Arc<FabricRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            machine_repo,
            order_repo,
            fabric_repo,
            config_manager,
        }
    }

    fn load_config(&self) -> ApiResult<SchedulingConfig> {
        self.config_manager
            .load_scheduling_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    // ==========================================
    // 推荐
    // ==========================================

    /// 计算订单的机台推荐列表 (不写库)
    #[instrument(skip(self))]
    pub fn recommend_machines(
        &self,
        order_id: &str,
        customer_name: Option<&str>,
        today: NaiveDate,
    ) -> ApiResult<Vec<Recommendation>> {
        if order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单ID不能为空".to_string()));
        }

        let config = self.load_config()?;
        let order = self.order_repo.get(order_id)?;
        let machines = self.machine_repo.find_all()?;
        let fabrics = self.fabric_repo.find_all()?;

        let engine = RecommendationEngine::new(&config);
        Ok(engine.recommend(&order, &machines, &fabrics, customer_name, today))
    }

    // ==========================================
    // 排产
    // ==========================================

    /// 指定机台 + 位置排产
    ///
    /// # 错误
    /// - `ApiError::IncompatibleMachine`: 机台不兼容且 allow_incompatible = false
    /// - `ApiError::OptimisticLockFailure`: 队列已被他人修改
    #[instrument(skip(self, request), fields(
        order_id = %request.order_id,
        machine_id = %request.machine_id
    ))]
    pub fn schedule_order(
        &self,
        request: &ScheduleOrderRequest,
        today: NaiveDate,
    ) -> ApiResult<ScheduleOrderResponse> {
        if request.order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单ID不能为空".to_string()));
        }
        if request.machine_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("机台ID不能为空".to_string()));
        }
        if let Some(q) = request.quantity {
            if !q.is_finite() || q <= 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "排产数量必须为正数 (quantity={})",
                    q
                )));
            }
        }

        let config = self.load_config()?;
        let order = self.order_repo.get(&request.order_id)?;
        if request.quantity.is_none() && order.schedulable_quantity() <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "订单{}无待排数量",
                order.order_id
            )));
        }

        let machines = self.machine_repo.find_all()?;
        let fabrics = self.fabric_repo.find_all()?;

        let machine = find_machine(&machines, &request.machine_id)?;

        let engine = RecommendationEngine::new(&config);
        let recommendation = engine
            .recommend(
                &order,
                &machines,
                &fabrics,
                request.customer_name.as_deref(),
                today,
            )
            .into_iter()
            .find(|r| r.machine_id == machine.machine_id)
            .ok_or_else(|| ApiError::InternalError("推荐结果缺少目标机台".to_string()))?;

        if !recommendation.is_compatible {
            if !request.allow_incompatible {
                return Err(ApiError::IncompatibleMachine {
                    machine_id: machine.machine_id.clone(),
                    score: recommendation.score,
                    reasons: recommendation.reasons.clone(),
                });
            }
            tracing::warn!(
                score = recommendation.score,
                reasons = ?recommendation.reasons,
                "强制指定不兼容机台"
            );
        }

        let chainer = ScheduleChainer::new(&config);
        let position = request.position.unwrap_or(machine.queue.len());
        let insertion =
            chainer.insert_order(machine, &order, position, request.quantity, &fabrics, today);

        let expected_revision = request.expected_revision.unwrap_or(machine.revision);
        let revision = self.machine_repo.replace_queue(
            &machine.machine_id,
            &insertion.queue,
            expected_revision,
        )?;

        tracing::info!(
            revision,
            position = insertion.position,
            changeover = insertion.changeover_item_id.is_some(),
            "排产完成"
        );

        Ok(ScheduleOrderResponse {
            machine_id: machine.machine_id.clone(),
            revision,
            position: insertion.position,
            production_item_id: insertion.production_item_id,
            changeover_item_id: insertion.changeover_item_id,
            recommendation,
            queue: insertion.queue,
        })
    }

    /// 自动选机排产: 取推荐第一且兼容的机台, 追加到队尾
    ///
    /// # 错误
    /// - `ApiError::NoCompatibleMachine`: 无兼容机台
    #[instrument(skip(self))]
    pub fn schedule_order_auto(
        &self,
        order_id: &str,
        quantity: Option<f64>,
        customer_name: Option<&str>,
        today: NaiveDate,
    ) -> ApiResult<ScheduleOrderResponse> {
        let recommendations = self.recommend_machines(order_id, customer_name, today)?;
        let selected = RecommendationEngine::auto_select(&recommendations)
            .ok_or_else(|| ApiError::NoCompatibleMachine(order_id.to_string()))?;

        tracing::info!(machine_id = %selected.machine_id, score = selected.score, "自动选机");

        let request = ScheduleOrderRequest {
            order_id: order_id.to_string(),
            machine_id: selected.machine_id.clone(),
            position: None,
            quantity,
            customer_name: customer_name.map(|s| s.to_string()),
            allow_incompatible: false,
            expected_revision: None,
        };
        self.schedule_order(&request, today)
    }

    // ==========================================
    // 队列维护
    // ==========================================

    /// 重新计算机台队列日期 (当前任务进度变化后)
    #[instrument(skip(self))]
    pub fn rechain_machine(
        &self,
        machine_id: &str,
        today: NaiveDate,
    ) -> ApiResult<QueueUpdateResponse> {
        let config = self.load_config()?;
        let machine = self.machine_repo.get(machine_id)?;
        let fabrics = self.fabric_repo.find_all()?;

        let queue = ScheduleChainer::new(&config).rechain(&machine.queue, &machine, &fabrics, today);
        self.persist(&machine, queue)
    }

    /// 删除计划条目 (多余的换品种条目一并清理)
    #[instrument(skip(self))]
    pub fn remove_plan_item(
        &self,
        machine_id: &str,
        item_id: &str,
        today: NaiveDate,
    ) -> ApiResult<QueueUpdateResponse> {
        let config = self.load_config()?;
        let machine = self.machine_repo.get(machine_id)?;
        let fabrics = self.fabric_repo.find_all()?;

        let queue = ScheduleChainer::new(&config)
            .remove_item(&machine, item_id, &fabrics, today)
            .ok_or_else(|| item_not_found(machine_id, item_id))?;
        self.persist(&machine, queue)
    }

    /// 调整计划条目位置
    #[instrument(skip(self))]
    pub fn move_plan_item(
        &self,
        machine_id: &str,
        item_id: &str,
        new_position: usize,
        today: NaiveDate,
    ) -> ApiResult<QueueUpdateResponse> {
        let config = self.load_config()?;
        let machine = self.machine_repo.get(machine_id)?;
        let fabrics = self.fabric_repo.find_all()?;

        let queue = ScheduleChainer::new(&config)
            .move_item(&machine, item_id, new_position, &fabrics, today)
            .ok_or_else(|| item_not_found(machine_id, item_id))?;
        self.persist(&machine, queue)
    }

    fn persist(&self, machine: &Machine, queue: Vec<PlanItem>) -> ApiResult<QueueUpdateResponse> {
        let revision =
            self.machine_repo
                .replace_queue(&machine.machine_id, &queue, machine.revision)?;
        tracing::info!(machine_id = %machine.machine_id, revision, items = queue.len(), "队列已更新");

        Ok(QueueUpdateResponse {
            machine_id: machine.machine_id.clone(),
            revision,
            queue,
        })
    }
}

fn find_machine<'a>(machines: &'a [Machine], machine_id: &str) -> ApiResult<&'a Machine> {
    machines
        .iter()
        .find(|m| m.machine_id == machine_id.trim())
        .ok_or_else(|| ApiError::NotFound(format!("Machine(id={})不存在", machine_id)))
}

fn item_not_found(machine_id: &str, item_id: &str) -> ApiError {
    ApiError::NotFound(format!(
        "PlanItem(id={})不在机台{}的队列中",
        item_id, machine_id
    ))
}
