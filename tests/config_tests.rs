//! Configuration loading: defaults, unknown-field tolerance, and range validation.

use std::io::Write;

use vtol_transition::config::{Config, PostTransitionAction};

#[test]
fn defaults_match_spec() {
    let config = Config::default();
    assert!(config.safety_lock);
    assert_eq!(config.initial_takeoff_height, 3.0);
    assert_eq!(config.transition_air_speed, 20.0);
    assert_eq!(config.transition_yaw_angle, -1.0);
    assert_eq!(config.post_transition_action, PostTransitionAction::ReturnToLaunch);
    config.validate().expect("defaults must validate");
}

#[test]
fn unknown_fields_are_ignored() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "safety_lock: false\nsome_future_field: 42").unwrap();

    let config = Config::load(file.path()).expect("unknown fields should not fail loading");
    assert!(!config.safety_lock);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_throttle: 0.9").unwrap();

    let config = Config::load(file.path()).expect("partial config should load");
    assert_eq!(config.max_throttle, 0.9);
    assert_eq!(config.initial_takeoff_height, Config::default().initial_takeoff_height);
}

#[test]
fn out_of_range_cycle_interval_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cycle_interval: 2.0").unwrap();

    let result = Config::load(file.path());
    assert!(result.is_err());
}

#[test]
fn missing_file_is_a_config_error() {
    let result = Config::load(std::path::Path::new("/nonexistent/transition.yaml"));
    assert!(matches!(result, Err(vtol_transition::Error::Config(_))));
}
