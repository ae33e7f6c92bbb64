// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use tempfile::NamedTempFile;
use textile_aps::db::{init_schema, open_sqlite_connection};
use textile_aps::domain::types::{MachineStatus, WorkflowStage};
use textile_aps::domain::{FabricDefinition, FabricSpec, Machine, Order, ProductionJob};
use textile_aps::repository::{
    FabricRepository, MachineRepository, OrderRepository, ProductionJobRepository,
};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是有效 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 固定的计算基准日
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

pub fn day(offset: i64) -> NaiveDate {
    today() + chrono::Duration::days(offset)
}

// ==========================================
// 测试数据构建
// ==========================================

/// 空闲机台 (无当前任务, 空队列)
pub fn idle_machine(id: &str, machine_type: &str, gauge: &str, diameter: &str) -> Machine {
    Machine {
        machine_id: id.to_string(),
        name: id.to_string(),
        machine_type: machine_type.to_string(),
        gauge: Some(gauge.to_string()),
        diameter: Some(diameter.to_string()),
        needle_count: None,
        status: MachineStatus::NoOrder,
        fabric: String::new(),
        client: String::new(),
        daily_rate: 100.0,
        avg_daily_rate: 100.0,
        remaining_quantity: 0.0,
        queue: vec![],
        revision: 0,
    }
}

/// 运行中机台
pub fn running_machine(id: &str, machine_type: &str, fabric: &str, remaining: f64) -> Machine {
    let mut machine = idle_machine(id, machine_type, "24", "30");
    machine.status = MachineStatus::Working;
    machine.fabric = fabric.to_string();
    machine.client = "ACME".to_string();
    machine.remaining_quantity = remaining;
    machine
}

pub fn fabric(
    id: &str,
    name: &str,
    default_rate: Option<f64>,
    compatible: &[&str],
    specs: Option<FabricSpec>,
) -> FabricDefinition {
    FabricDefinition {
        fabric_id: id.to_string(),
        name: name.to_string(),
        short_name: None,
        default_daily_rate: default_rate,
        machine_rate_overrides: HashMap::new(),
        compatible_machines: compatible.iter().map(|s| s.to_string()).collect(),
        specs,
    }
}

pub fn order(id: &str, customer: &str, fabric: &str, quantity: f64) -> Order {
    Order {
        order_id: id.to_string(),
        customer: customer.to_string(),
        fabric: fabric.to_string(),
        required_quantity: quantity,
        remaining_quantity: quantity,
        reference: Some(format!("REF-{}", id)),
    }
}

pub fn job(id: &str, key: &str, formation: Option<NaiveDate>, stage: WorkflowStage) -> ProductionJob {
    ProductionJob {
        job_id: id.to_string(),
        capacity_key: key.to_string(),
        formation_date: formation,
        stage,
    }
}

// ==========================================
// 数据写入
// ==========================================

pub fn seed_machines(db_path: &str, machines: &[Machine]) -> Result<(), Box<dyn Error>> {
    let repo = MachineRepository::new(db_path)?;
    for m in machines {
        repo.upsert(m)?;
    }
    Ok(())
}

pub fn seed_fabrics(db_path: &str, fabrics: &[FabricDefinition]) -> Result<(), Box<dyn Error>> {
    let repo = FabricRepository::new(db_path)?;
    for f in fabrics {
        repo.upsert(f)?;
    }
    Ok(())
}

pub fn seed_orders(db_path: &str, orders: &[Order]) -> Result<(), Box<dyn Error>> {
    let repo = OrderRepository::new(db_path)?;
    for o in orders {
        repo.upsert(o)?;
    }
    Ok(())
}

pub fn seed_jobs(db_path: &str, jobs: &[ProductionJob]) -> Result<(), Box<dyn Error>> {
    let repo = ProductionJobRepository::new(db_path)?;
    for j in jobs {
        repo.upsert(j)?;
    }
    Ok(())
}
