// ==========================================
// QueueApi 集成测试
// ==========================================
// 测试目标: 共享产能机台的排队位置展示
// ==========================================

mod test_helpers;

use test_helpers::*;
use textile_aps::api::ApiError;
use textile_aps::app::AppState;
use textile_aps::config::config_keys;
use textile_aps::domain::types::WorkflowStage;

fn setup() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_jobs(
        &db_path,
        &[
            job("J3", "M1", Some(day(3)), WorkflowStage::Formed),
            job("J1", "M1", Some(day(1)), WorkflowStage::Finishing),
            job("J2", "M1", Some(day(2)), WorkflowStage::Dyeing),
            job("J4", "M1", None, WorkflowStage::Formed),
            job("SOLO", "M2", Some(day(1)), WorkflowStage::Formed),
        ],
    )
    .expect("Failed to seed jobs");

    let state = AppState::new(db_path).expect("Failed to create AppState");
    (temp_file, state)
}

#[test]
fn test_queue_info_orders_by_formation_date() {
    let (_temp_file, state) = setup();

    let info = state.queue_api.queue_info("J2").unwrap().unwrap();
    assert_eq!(info.position, 2);
    assert_eq!(info.total, 4);
    assert_eq!(info.finished_before, 1);
    assert_eq!(info.still_ahead_count, 0);

    // 缺失建单日期排最后
    let info = state.queue_api.queue_info("J4").unwrap().unwrap();
    assert_eq!(info.position, 4);
    // J1 越过染色, J2 停在染色, J3 未开始
    assert_eq!(info.finished_before, 1);
    assert_eq!(info.still_ahead_count, 2);
}

#[test]
fn test_queue_info_single_job_group_is_none() {
    let (_temp_file, state) = setup();
    assert!(state.queue_api.queue_info("SOLO").unwrap().is_none());
}

#[test]
fn test_queue_info_unknown_job() {
    let (_temp_file, state) = setup();
    assert!(matches!(
        state.queue_api.queue_info("NOPE"),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.queue_api.queue_info("  "),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_queue_info_reference_stage_from_config() {
    let (_temp_file, state) = setup();

    state
        .config_manager
        .set_global_config_value(config_keys::QUEUE_REFERENCE_STAGE, "RAW_INSPECTION")
        .unwrap();

    let info = state.queue_api.queue_info("J4").unwrap().unwrap();
    // J1 (Finishing) 与 J2 (Dyeing) 均越过坯布检验
    assert_eq!(info.finished_before, 2);
    assert_eq!(info.still_ahead_count, 1);
}
