//! Unit tests for configuration validation.

use safety_stepper_array::config::{parse_config, validate_config, ArrayConfig};
use safety_stepper_array::error::{ConfigError, Error};
use safety_stepper_array::{StepsPerSec, StepsPerSecSquared};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
max_speed_steps_per_sec = 1000.0
max_acceleration_steps_per_sec2 = 2000.0

[[axes]]
name = "arm"
safe_position = 10
max_speed_steps_per_sec = 1000.0
"#;

    let config: ArrayConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for an axis faster than the array allows.
#[test]
fn test_axis_speed_over_limit() {
    let toml_str = r#"
max_speed_steps_per_sec = 1000.0
max_acceleration_steps_per_sec2 = 2000.0

[[axes]]
name = "arm"
safe_position = 0
max_speed_steps_per_sec = 1200.0
"#;

    match parse_config(toml_str) {
        Err(Error::Config(ConfigError::AxisSpeedExceedsLimit { axis, requested, .. })) => {
            assert_eq!(axis.as_str(), "arm");
            assert_eq!(requested, 1200.0);
        }
        other => panic!("Expected AxisSpeedExceedsLimit, got {:?}", other),
    }
}

/// Test validation fails for a negative safe position.
#[test]
fn test_negative_safe_position() {
    let toml_str = r#"
max_speed_steps_per_sec = 1000.0
max_acceleration_steps_per_sec2 = 2000.0

[[axes]]
name = "arm"
safe_position = -5
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::NegativeSafePosition { position: -5, .. }))
    ));
}

/// Test validation of the home speed against the max speed.
#[test]
fn test_home_speed_over_max() {
    let config = ArrayConfig::new(StepsPerSec(1000.0), StepsPerSecSquared(2000.0))
        .with_home_speed(StepsPerSec(1500.0));

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidHomeSpeed { .. }))
    ));
}

/// Test validation of non-positive maxima.
#[test]
fn test_zero_maxima_rejected() {
    let config = ArrayConfig::new(StepsPerSec(0.0), StepsPerSecSquared(2000.0));
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxSpeed(_)))
    ));

    let config = ArrayConfig::new(StepsPerSec(1000.0), StepsPerSecSquared(-1.0));
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxAcceleration(_)))
    ));
}

/// Test that an array configuration without axes is valid.
#[test]
fn test_empty_axes_is_valid() {
    let config = ArrayConfig::new(StepsPerSec(500.0), StepsPerSecSquared(500.0));
    assert!(validate_config(&config).is_ok());
}
