//! Unit tests for TOML configuration parsing.

use safety_stepper_array::config::{load_config, parse_config, ArrayConfig, Timing};
use safety_stepper_array::error::{ConfigError, Error};
use safety_stepper_array::{Steps, StepsPerSec};

/// Test parsing a configuration with every key present.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
max_speed_steps_per_sec = 2000.0
max_acceleration_steps_per_sec2 = 4000.0
home_speed_steps_per_sec = 500.0
reversed = true

[timing]
timeout_ms = 2500
motion_hold_ms = 750
catchup_ms = 5

[[axes]]
name = "door"
safe_position = 100
max_speed_steps_per_sec = 1500.0
acceleration_steps_per_sec2 = 3000.0

[[axes]]
name = "valve"
safe_position = 0
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.max_speed.0, 2000.0);
    assert_eq!(config.max_acceleration.0, 4000.0);
    assert_eq!(config.effective_home_speed(), StepsPerSec(500.0));
    assert!(config.reversed);
    assert_eq!(
        config.timing,
        Timing {
            timeout_ms: 2500,
            motion_hold_ms: 750,
            catchup_ms: 5,
        }
    );

    let door = config.axis("door").expect("Axis not found");
    assert_eq!(door.safe_position, Steps(100));
    assert_eq!(door.max_speed.unwrap().0, 1500.0);
    assert_eq!(door.acceleration.unwrap().0, 3000.0);

    let valve = config.axis("valve").expect("Axis not found");
    assert!(valve.max_speed.is_none());
    assert_eq!(config.axis_names().collect::<Vec<_>>(), ["door", "valve"]);
}

/// Test that omitted optional keys fall back to defaults.
#[test]
fn test_partial_timing_table() {
    let toml_str = r#"
max_speed_steps_per_sec = 1000.0
max_acceleration_steps_per_sec2 = 1000.0

[timing]
timeout_ms = 800
"#;

    let config: ArrayConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.timing.timeout_ms, 800);
    assert_eq!(config.timing.motion_hold_ms, 1_000);
    assert_eq!(config.timing.catchup_ms, 10);
    assert!(!config.reversed);
    assert!(config.axes.is_empty());
}

/// Test that a missing required key is a parse error.
#[test]
fn test_missing_max_speed_rejected() {
    let toml_str = r#"
max_acceleration_steps_per_sec2 = 1000.0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test loading from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("safety_stepper_array_unit_load.toml");
    std::fs::write(
        &path,
        "max_speed_steps_per_sec = 800.0\nmax_acceleration_steps_per_sec2 = 1600.0\n",
    )
    .expect("write temp config");

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.max_speed.0, 800.0);

    std::fs::remove_file(&path).ok();
}
