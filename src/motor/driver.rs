//! STEP/DIR stepper driver.
//!
//! Generic over embedded-hal 1.0 pin types.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};
use crate::error::{MotorError, Result};
use crate::motion::{AccelRamp, Direction};

use super::stepper::Stepper;

/// Default STEP pulse width in microseconds.
pub const DEFAULT_PULSE_WIDTH_US: u32 = 2;

/// Stepper driver toggling STEP/DIR lines on an acceleration ramp.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
pub struct StepDirStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// STEP pin (pulse to move one step).
    step_pin: STEP,

    /// DIR pin (high = CW, low = CCW, or inverted).
    dir_pin: DIR,

    /// Delay provider for pulse width.
    delay: DELAY,

    /// Step timing and position.
    ramp: AccelRamp,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Whether the STEP pulse is active-low.
    invert_step: bool,

    /// STEP pulse width in microseconds.
    pulse_width_us: u32,
}

impl<STEP, DIR, DELAY> StepDirStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a stopped driver at position 0 with 1 step/s, 1 step/s² rates.
    ///
    /// The array applies its global maxima on registration.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            ramp: AccelRamp::new(1.0, 1.0),
            current_direction: None,
            invert_direction: false,
            invert_step: false,
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
        }
    }

    /// Set the STEP pulse width.
    pub fn with_pulse_width_us(mut self, pulse_width_us: u32) -> Self {
        self.pulse_width_us = pulse_width_us;
        self
    }

    /// Get the acceleration in steps/sec².
    #[inline]
    pub fn acceleration(&self) -> StepsPerSecSquared {
        StepsPerSecSquared(self.ramp.acceleration())
    }

    /// Get the signed speed in steps/sec.
    #[inline]
    pub fn speed(&self) -> StepsPerSec {
        StepsPerSec(self.ramp.speed())
    }

    /// Release the pins and delay provider.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    fn set_step_line(&mut self, active: bool) -> Result<()> {
        if active != self.invert_step {
            self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        Ok(())
    }

    fn pulse(&mut self) -> Result<()> {
        self.set_step_line(true)?;
        self.delay.delay_us(self.pulse_width_us);
        self.set_step_line(false)
    }
}

impl<STEP, DIR, DELAY> Stepper for StepDirStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    fn set_max_speed(&mut self, speed: StepsPerSec) {
        self.ramp.set_max_speed(speed.0);
    }

    fn max_speed(&self) -> StepsPerSec {
        StepsPerSec(self.ramp.max_speed())
    }

    fn set_acceleration(&mut self, acceleration: StepsPerSecSquared) {
        self.ramp.set_acceleration(acceleration.0);
    }

    fn move_to(&mut self, target: Steps) {
        self.ramp.move_to(target.0);
    }

    fn target_position(&self) -> Steps {
        Steps(self.ramp.target())
    }

    fn run(&mut self, now_us: u64) -> Result<bool> {
        let Some(direction) = self.ramp.step_due(now_us) else {
            return Ok(false);
        };

        self.set_direction(direction)?;
        self.pulse()?;
        self.ramp.commit_step(direction, now_us);
        Ok(true)
    }

    fn distance_to_go(&self) -> i64 {
        self.ramp.distance_to_go()
    }

    fn current_position(&self) -> Steps {
        Steps(self.ramp.position())
    }

    fn set_current_position(&mut self, position: Steps) {
        self.ramp.set_position(position.0);
    }

    fn next_direction(&self) -> Option<Direction> {
        self.ramp.heading()
    }

    fn set_pins_inverted(&mut self, direction: bool, step: bool) {
        if self.invert_direction != direction {
            // Force a DIR rewrite on the next step.
            self.current_direction = None;
        }
        self.invert_direction = direction;
        self.invert_step = step;
    }
}
