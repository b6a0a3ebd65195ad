//! Hardware-free stand-ins for motors, switches and power lines.
//!
//! These let an array run on a host with [`SimClock`](crate::clock::SimClock):
//! switch and pin state live in `Cell`s owned by the caller, so a test can
//! flip a limit switch or inspect a power line while the array holds the pin.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};
use crate::error::Result;
use crate::motion::Direction;
use crate::motor::Stepper;

/// Simulated motor that moves exactly one step per [`Stepper::run`] call.
///
/// Timing is ignored; rates and pin inversion are only recorded.
#[derive(Debug, Clone, Default)]
pub struct SimStepper {
    position: i64,
    target: i64,
    max_speed: StepsPerSec,
    acceleration: StepsPerSecSquared,
    direction_inverted: bool,
    step_inverted: bool,
    steps_taken: u64,
}

impl SimStepper {
    /// Motor at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Motor resting at `position`.
    pub fn at(position: Steps) -> Self {
        Self {
            position: position.0,
            target: position.0,
            ..Self::default()
        }
    }

    /// Total steps emitted so far.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Last acceleration set.
    pub fn acceleration(&self) -> StepsPerSecSquared {
        self.acceleration
    }

    /// Whether the direction line is inverted.
    pub fn direction_inverted(&self) -> bool {
        self.direction_inverted
    }

    /// Whether the step line is inverted.
    pub fn step_inverted(&self) -> bool {
        self.step_inverted
    }
}

impl Stepper for SimStepper {
    fn set_max_speed(&mut self, speed: StepsPerSec) {
        self.max_speed = StepsPerSec(libm::fabsf(speed.0));
    }

    fn max_speed(&self) -> StepsPerSec {
        self.max_speed
    }

    fn set_acceleration(&mut self, acceleration: StepsPerSecSquared) {
        self.acceleration = acceleration;
    }

    fn move_to(&mut self, target: Steps) {
        self.target = target.0;
    }

    fn target_position(&self) -> Steps {
        Steps(self.target)
    }

    fn run(&mut self, _now_us: u64) -> Result<bool> {
        let delta = self.target - self.position;
        if delta == 0 {
            return Ok(false);
        }
        self.position += delta.signum();
        self.steps_taken += 1;
        Ok(true)
    }

    fn distance_to_go(&self) -> i64 {
        self.target - self.position
    }

    fn current_position(&self) -> Steps {
        Steps(self.position)
    }

    fn set_current_position(&mut self, position: Steps) {
        self.position = position.0;
        self.target = position.0;
    }

    fn next_direction(&self) -> Option<Direction> {
        match self.target - self.position {
            0 => None,
            delta => Some(Direction::from_steps(delta)),
        }
    }

    fn set_pins_inverted(&mut self, direction: bool, step: bool) {
        self.direction_inverted = direction;
        self.step_inverted = step;
    }
}

/// Simulated pulled-up limit switch: reads low while `triggered` is set.
#[derive(Debug, Clone, Copy)]
pub struct SimSwitch<'a> {
    triggered: &'a Cell<bool>,
}

impl<'a> SimSwitch<'a> {
    /// Switch whose state follows `triggered`.
    pub fn new(triggered: &'a Cell<bool>) -> Self {
        Self { triggered }
    }
}

impl ErrorType for SimSwitch<'_> {
    type Error = Infallible;
}

impl InputPin for SimSwitch<'_> {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.triggered.get())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.triggered.get())
    }
}

/// Simulated output line whose level is mirrored into `level`.
#[derive(Debug, Clone, Copy)]
pub struct SimPin<'a> {
    level: &'a Cell<bool>,
}

impl<'a> SimPin<'a> {
    /// Pin writing its level into `level` (true = high).
    pub fn new(level: &'a Cell<bool>) -> Self {
        Self { level }
    }
}

impl ErrorType for SimPin<'_> {
    type Error = Infallible;
}

impl OutputPin for SimPin<'_> {
    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }
}
