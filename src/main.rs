// ==========================================
// 针织排产系统 - 命令行入口
// ==========================================
// 输出: 结果以 JSON 打印到 stdout, 日志写 stderr
// ==========================================

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use textile_aps::api::ScheduleOrderRequest;
use textile_aps::app::{get_default_db_path, AppState};
use textile_aps::logging;

/// 针织排产 - 机台推荐与排程链计算
#[derive(Parser, Debug)]
#[command(name = "textile-aps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 数据库文件路径 (默认: 用户数据目录)
    #[arg(long, global = true)]
    db: Option<String>,

    /// 计算基准日 (YYYY-MM-DD, 默认今天)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// 日志输出为 JSON
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 计算订单的机台推荐列表
    Recommend {
        order_id: String,

        /// 客户名 (默认取订单客户)
        #[arg(long)]
        customer: Option<String>,
    },

    /// 排产: 指定机台, 或省略 --machine 自动选机
    Schedule {
        order_id: String,

        #[arg(short, long)]
        machine: Option<String>,

        /// 插入位置 (默认队尾)
        #[arg(short, long)]
        position: Option<usize>,

        /// 排产数量 (默认订单待排数量)
        #[arg(short, long)]
        quantity: Option<f64>,

        #[arg(long)]
        customer: Option<String>,

        /// 强制指定不兼容机台
        #[arg(long)]
        force: bool,
    },

    /// 重新计算机台队列日期
    Rechain { machine_id: String },

    /// 删除计划条目
    RemoveItem { machine_id: String, item_id: String },

    /// 调整计划条目位置
    MoveItem {
        machine_id: String,
        item_id: String,
        position: usize,
    },

    /// 查看机台当前队列
    ShowQueue { machine_id: String },

    /// 查询批次排队位置
    QueueInfo { job_id: String },

    /// 设置全局配置项
    SetConfig { key: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_log);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{} 使用数据库: {}", textile_aps::APP_NAME, textile_aps::VERSION, db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Commands::Recommend { order_id, customer } => {
            let recs = state
                .scheduling_api
                .recommend_machines(&order_id, customer.as_deref(), today)?;
            print_json(&recs)
        }
        Commands::Schedule {
            order_id,
            machine,
            position,
            quantity,
            customer,
            force,
        } => {
            let response = match machine {
                Some(machine_id) => state.scheduling_api.schedule_order(
                    &ScheduleOrderRequest {
                        order_id,
                        machine_id,
                        position,
                        quantity,
                        customer_name: customer,
                        allow_incompatible: force,
                        expected_revision: None,
                    },
                    today,
                )?,
                None => state.scheduling_api.schedule_order_auto(
                    &order_id,
                    quantity,
                    customer.as_deref(),
                    today,
                )?,
            };
            print_json(&response)
        }
        Commands::Rechain { machine_id } => {
            print_json(&state.scheduling_api.rechain_machine(&machine_id, today)?)
        }
        Commands::RemoveItem {
            machine_id,
            item_id,
        } => print_json(
            &state
                .scheduling_api
                .remove_plan_item(&machine_id, &item_id, today)?,
        ),
        Commands::MoveItem {
            machine_id,
            item_id,
            position,
        } => print_json(
            &state
                .scheduling_api
                .move_plan_item(&machine_id, &item_id, position, today)?,
        ),
        Commands::ShowQueue { machine_id } => {
            let machine = state.machine_repo.get(&machine_id)?;
            print_json(&machine.queue)
        }
        Commands::QueueInfo { job_id } => print_json(&state.queue_api.queue_info(&job_id)?),
        Commands::SetConfig { key, value } => {
            state
                .config_manager
                .set_global_config_value(&key, &value)
                .map_err(|e| anyhow::anyhow!("配置写入失败: {}", e))?;
            let snapshot = state
                .config_manager
                .get_config_snapshot()
                .map_err(|e| anyhow::anyhow!("配置读取失败: {}", e))?;
            println!("{}", snapshot);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON 序列化失败")?;
    println!("{}", text);
    Ok(())
}
