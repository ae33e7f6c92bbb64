// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 队列 JSON 持久化 + revision 乐观锁 (跨连接)
// ==========================================

mod test_helpers;

use std::sync::Arc;
use std::thread;

use test_helpers::*;
use textile_aps::domain::types::WorkflowStage;
use textile_aps::domain::PlanItem;
use textile_aps::engine::ScheduleChainer;
use textile_aps::api::ApiError;
use textile_aps::repository::{
    FabricRepository, MachineRepository, OrderRepository, ProductionJobRepository,
    RepositoryError,
};

#[test]
fn test_queue_roundtrip_through_repository() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let machine = running_machine("M", "Single Jersey", "A", 200.0);
    seed_machines(&db_path, &[machine.clone()]).unwrap();

    let chainer = ScheduleChainer::default();
    let insertion = chainer.insert_order(
        &machine,
        &order("O-B", "Globex", "B", 900.0),
        0,
        None,
        &[],
        today(),
    );

    let repo = MachineRepository::new(&db_path).unwrap();
    let revision = repo.replace_queue("M", &insertion.queue, 0).unwrap();
    assert_eq!(revision, 1);

    let stored = repo.get("M").unwrap();
    assert_eq!(stored.queue, insertion.queue);
    assert_eq!(stored.queue[1].end_date, day(13));
}

#[test]
fn test_concurrent_replace_queue_one_winner() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_machines(&db_path, &[idle_machine("M", "Single Jersey", "24", "30")]).unwrap();

    let db_path = Arc::new(db_path);
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let db_path = Arc::clone(&db_path);
            thread::spawn(move || {
                let repo = MachineRepository::new(&db_path).unwrap();
                let item = PlanItem::production(&format!("F{}", i), 100.0, "X", None, today());
                repo.replace_queue("M", &[item], 0)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(RepositoryError::OptimisticLockFailure { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);

    let stored = MachineRepository::new(&db_path).unwrap().get("M").unwrap();
    assert_eq!(stored.revision, 1);
    assert_eq!(stored.queue.len(), 1);
}

#[test]
fn test_order_and_job_repositories() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_orders(&db_path, &[order("O-1", "ACME", "Pique", 500.0)]).unwrap();
    seed_jobs(
        &db_path,
        &[
            job("J1", "M1", Some(day(1)), WorkflowStage::Knitting),
            job("J2", "M1", None, WorkflowStage::Formed),
            job("J3", "M2", Some(day(2)), WorkflowStage::Delivered),
        ],
    )
    .unwrap();

    let orders = OrderRepository::new(&db_path).unwrap();
    let o = orders.get("O-1").unwrap();
    assert_eq!(o.customer, "ACME");
    assert_eq!(o.reference.as_deref(), Some("REF-O-1"));
    assert!(orders.find_by_id("O-2").unwrap().is_none());

    let jobs = ProductionJobRepository::new(&db_path).unwrap();
    let group = jobs.find_by_capacity_key("M1").unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group[0].stage, WorkflowStage::Knitting);
    assert_eq!(group[1].formation_date, None);

    let j3 = jobs.find_by_id("J3").unwrap().unwrap();
    assert_eq!(j3.formation_date, Some(day(2)));
    assert_eq!(j3.stage, WorkflowStage::Delivered);
    assert_eq!(jobs.find_all().unwrap().len(), 3);
}

#[test]
fn test_unopenable_database_is_connection_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("missing_dir")
        .join("aps.db")
        .to_string_lossy()
        .to_string();

    match MachineRepository::new(&db_path) {
        Err(RepositoryError::DatabaseConnectionError(msg)) => assert!(msg.contains("aps.db")),
        other => panic!("Expected DatabaseConnectionError, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(
        FabricRepository::new(&db_path),
        Err(RepositoryError::DatabaseConnectionError(_))
    ));

    let api_err: ApiError = match OrderRepository::new(&db_path) {
        Err(err) => err.into(),
        Ok(_) => panic!("Expected open failure"),
    };
    assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
}
