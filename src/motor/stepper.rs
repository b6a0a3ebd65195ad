//! The motor-stepping capability consumed by the array.

use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};
use crate::error::Result;
use crate::motion::Direction;

/// A motor that can chase an absolute target one step at a time.
///
/// The array never generates pulses itself. It sets targets and rates, then
/// calls [`Stepper::run`] once per cycle; the implementation decides whether
/// a step is due. [`StepDirStepper`](super::StepDirStepper) drives real
/// STEP/DIR pins, [`SimStepper`](crate::sim::SimStepper) is a hardware-free
/// stand-in.
pub trait Stepper {
    /// Set the speed ceiling. The sign is ignored.
    fn set_max_speed(&mut self, speed: StepsPerSec);

    /// Current speed ceiling.
    fn max_speed(&self) -> StepsPerSec;

    /// Set the acceleration and deceleration rate.
    fn set_acceleration(&mut self, acceleration: StepsPerSecSquared);

    /// Set a new absolute target.
    fn move_to(&mut self, target: Steps);

    /// Most recently commanded target.
    fn target_position(&self) -> Steps;

    /// Emit at most one step toward the target if one is due at `now_us`.
    ///
    /// Returns `Ok(true)` when a step was emitted.
    fn run(&mut self, now_us: u64) -> Result<bool>;

    /// Signed steps remaining to the target.
    fn distance_to_go(&self) -> i64;

    /// Position as counted from emitted steps.
    fn current_position(&self) -> Steps;

    /// Redefine the current position. The target moves with it and motion stops.
    fn set_current_position(&mut self, position: Steps);

    /// Direction the next emitted step will take, or `None` when at rest on
    /// the target.
    ///
    /// While decelerating after a reversal this differs from the sign of
    /// [`distance_to_go`](Self::distance_to_go).
    fn next_direction(&self) -> Option<Direction>;

    /// Invert the direction and/or step line polarity.
    fn set_pins_inverted(&mut self, direction: bool, step: bool);

    /// Halt immediately where the motor stands, dropping any speed.
    #[inline]
    fn stop(&mut self) {
        let here = self.current_position();
        self.set_current_position(here);
    }

    /// Whether the motor still has somewhere to go.
    #[inline]
    fn is_moving(&self) -> bool {
        self.distance_to_go() != 0
    }
}
