//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{ArrayConfig, AxisConfig};

/// Validate an array configuration.
///
/// Checks:
/// - Global maxima are positive
/// - Home speed lies in (0, max speed]
/// - Per-axis overrides lie in (0, global max]
/// - Safe positions are not negative
pub fn validate_config(config: &ArrayConfig) -> Result<()> {
    let max_speed = config.max_speed.0;
    if !is_positive(max_speed) {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed(max_speed)));
    }

    let max_acceleration = config.max_acceleration.0;
    if !is_positive(max_acceleration) {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(
            max_acceleration,
        )));
    }

    let home_speed = config.effective_home_speed().0;
    if !is_positive(home_speed) || home_speed > max_speed {
        return Err(Error::Config(ConfigError::InvalidHomeSpeed {
            requested: home_speed,
            max: max_speed,
        }));
    }

    for axis in config.axes.iter() {
        validate_axis(axis, config)?;
    }

    Ok(())
}

/// NaN is not positive.
#[inline]
fn is_positive(value: f32) -> bool {
    value > 0.0
}

fn validate_axis(axis: &AxisConfig, config: &ArrayConfig) -> Result<()> {
    if axis.safe_position.is_negative() {
        return Err(Error::Config(ConfigError::NegativeSafePosition {
            axis: axis.name.clone(),
            position: axis.safe_position.0,
        }));
    }

    if let Some(speed) = axis.max_speed {
        if !is_positive(speed.0) || speed > config.max_speed {
            return Err(Error::Config(ConfigError::AxisSpeedExceedsLimit {
                axis: axis.name.clone(),
                requested: speed.0,
                max: config.max_speed.0,
            }));
        }
    }

    if let Some(acceleration) = axis.acceleration {
        if !is_positive(acceleration.0) || acceleration > config.max_acceleration {
            return Err(Error::Config(ConfigError::AxisAccelerationExceedsLimit {
                axis: axis.name.clone(),
                requested: acceleration.0,
                max: config.max_acceleration.0,
            }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};

    fn base() -> ArrayConfig {
        ArrayConfig::new(StepsPerSec(2000.0), StepsPerSecSquared(4000.0))
    }

    fn axis(name: &str) -> AxisConfig {
        AxisConfig {
            name: heapless::String::try_from(name).unwrap(),
            safe_position: Steps(0),
            max_speed: None,
            acceleration: None,
        }
    }

    #[test]
    fn test_valid_defaults() {
        assert!(validate_config(&base()).is_ok());
    }

    #[test]
    fn test_zero_max_speed() {
        let mut config = base();
        config.max_speed = StepsPerSec(0.0);
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidMaxSpeed(_)))
        ));
    }

    #[test]
    fn test_home_speed_over_max() {
        let config = base().with_home_speed(StepsPerSec(2500.0));
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidHomeSpeed { .. }))
        ));
    }

    #[test]
    fn test_negative_safe_position() {
        let mut config = base();
        let mut lift = axis("lift");
        lift.safe_position = Steps(-5);
        config.axes.push(lift).unwrap();

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::NegativeSafePosition { position: -5, .. }))
        ));
    }

    #[test]
    fn test_axis_acceleration_over_max() {
        let mut config = base();
        let mut lift = axis("lift");
        lift.acceleration = Some(StepsPerSecSquared(4000.5));
        config.axes.push(lift).unwrap();

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::AxisAccelerationExceedsLimit { .. }))
        ));
    }
}
