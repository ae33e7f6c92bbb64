// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 默认值 + config_kv 覆写 + 错误值回退
// ==========================================

mod test_helpers;

use test_helpers::*;
use textile_aps::api::ScheduleOrderRequest;
use textile_aps::app::AppState;
use textile_aps::config::{config_keys, ConfigManager, SchedulingConfig};
use textile_aps::domain::types::{MachineCategory, WorkflowStage};

#[test]
fn test_defaults_without_overrides() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = manager.load_scheduling_config().unwrap();
    let defaults = SchedulingConfig::default();
    assert_eq!(config.default_daily_rate, 100.0);
    assert_eq!(config.changeover_days(MachineCategory::SingleJersey), 2);
    assert_eq!(config.changeover_days(MachineCategory::DoubleJersey), 4);
    assert_eq!(config.changeover_days(MachineCategory::Jacquard), 4);
    assert_eq!(config.changeover_days(MachineCategory::Unknown), 2);
    assert_eq!(config.weights.not_in_history, defaults.weights.not_in_history);
    assert_eq!(config.queue_reference_stage, WorkflowStage::Dyeing);
}

#[test]
fn test_overrides_and_invalid_values() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::DEFAULT_DAILY_RATE, "80")
        .unwrap();
    manager
        .set_global_config_value(config_keys::CHANGEOVER_DAYS_DOUBLE, "5")
        .unwrap();
    manager
        .set_global_config_value(config_keys::CHANGEOVER_DAYS_SINGLE, "zero")
        .unwrap();
    manager
        .set_global_config_value(config_keys::SCORE_WEIGHTS, "{not json")
        .unwrap();

    let config = manager.load_scheduling_config().unwrap();
    assert_eq!(config.default_daily_rate, 80.0);
    assert_eq!(config.changeover_days(MachineCategory::DoubleJersey), 5);
    // 错误值回退默认
    assert_eq!(config.changeover_days(MachineCategory::SingleJersey), 2);
    assert_eq!(config.weights.proven_history, 100);

    let snapshot = manager.get_config_snapshot().unwrap();
    assert!(snapshot.contains("default_daily_rate"));
    assert_eq!(
        manager
            .get_global_config_value(config_keys::DEFAULT_DAILY_RATE)
            .unwrap()
            .as_deref(),
        Some("80")
    );
}

#[test]
fn test_partial_score_weights_json() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::SCORE_WEIGHTS, r#"{"same_client": 45}"#)
        .unwrap();

    let config = manager.load_scheduling_config().unwrap();
    assert_eq!(config.weights.same_client, 45);
    assert_eq!(config.weights.proven_history, 100);
}

#[test]
fn test_changeover_override_flows_into_scheduling() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_machines(&db_path, &[running_machine("M", "Single Jersey", "A", 200.0)]).unwrap();
    seed_orders(&db_path, &[order("O-B", "Globex", "B", 300.0)]).unwrap();

    let state = AppState::new(db_path).unwrap();
    state
        .config_manager
        .set_global_config_value(config_keys::CHANGEOVER_DAYS_SINGLE, "3")
        .unwrap();

    let response = state
        .scheduling_api
        .schedule_order(
            &ScheduleOrderRequest {
                order_id: "O-B".to_string(),
                machine_id: "M".to_string(),
                ..Default::default()
            },
            today(),
        )
        .unwrap();

    assert_eq!(response.queue[0].days, 3);
    assert_eq!(response.queue[0].end_date, day(5));
    assert_eq!(response.queue[1].end_date, day(8));
}
