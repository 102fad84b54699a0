//! Integration tests for the command layer in demo mode

use dealboard::commands::common::open_store;
use dealboard::commands::{deals, stages};
use dealboard::config::Config;
use dealboard::error::ConfigError;

#[test]
fn test_demo_store_needs_no_backend() {
    let store = open_store(&Config::default(), true).expect("Should open demo store");
    let stages = store.fetch_stages().expect("Should fetch stages");
    assert_eq!(stages.len(), 6);
}

#[test]
fn test_missing_backend_is_reported() {
    let err = match open_store(&Config::default(), false) {
        Ok(_) => panic!("Should require a backend"),
        Err(err) => err,
    };
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingBackend)
    ));
}

#[test]
fn test_move_by_key_and_by_id() {
    let config = Config::default();
    deals::move_deal(&config, true, "d-101", "qualified").expect("Should move by key");
    deals::move_deal(&config, true, "d-101", "st-won").expect("Should move by id");
}

#[test]
fn test_move_to_current_stage_is_ok() {
    deals::move_deal(&Config::default(), true, "d-101", "lead").expect("Should be a no-op");
}

#[test]
fn test_move_rejects_unknown_targets() {
    let config = Config::default();
    let err = deals::move_deal(&config, true, "d-101", "archived").unwrap_err();
    assert!(err.to_string().contains("Unknown stage"));

    let err = deals::move_deal(&config, true, "d-999", "won").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_list_and_stages_in_demo_mode() {
    let config = Config::default();
    deals::list(&config, true, None, None, None).expect("Should list all deals");
    deals::list(
        &config,
        true,
        Some("u-ana".to_string()),
        None,
        Some("lead".to_string()),
    )
    .expect("Should list filtered deals");
    assert!(deals::list(&config, true, None, None, Some("nope".to_string())).is_err());
    stages::execute(&config, true).expect("Should print stages");
}
