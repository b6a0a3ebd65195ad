//! The per-cycle poll.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::error::Result;
use crate::motion::Direction;
use crate::motor::Stepper;

use super::state::{PowerAction, SafetyMode};
use super::StepperArray;

impl<M, L, WAKE, EN, C, const N: usize> StepperArray<M, L, WAKE, EN, C, N>
where
    M: Stepper,
    L: InputPin,
    WAKE: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    /// Run one control cycle. Call this as often as possible.
    ///
    /// In order: scan for motion, re-evaluate the staleness and motion-hold
    /// timers, point every motor at its operator or safe position, apply the
    /// power hysteresis, then give each axis one chance to step. Stepping
    /// waits out the catch-up interval after power comes on. An axis whose
    /// limit switch is pressed and whose next step would go negative is
    /// stopped where it stands instead.
    ///
    /// Fails with [`HomingError::InProgress`](crate::error::HomingError)
    /// while a homing session owns the axes.
    pub fn poll(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let now = self.clock.now_micros();

        let moving = self.axes.any_moving();

        let mode = self.state.update_mode(now);
        self.state.note_motion(moving, now);

        for axis in self.axes.iter_mut() {
            let destination = match mode {
                SafetyMode::Normal => axis.target,
                SafetyMode::Safing => axis.safe_position,
            };
            axis.motor.move_to(destination);
        }

        // Distances after retargeting: a fresh safe-position move must keep
        // power on even if nothing was moving a moment ago.
        let settled = !self.axes.any_moving();
        self.state.note_motion(!settled, now);
        match self.state.power_decision(settled, now) {
            PowerAction::Disable if self.state.enabled => self.power_off()?,
            PowerAction::Enable => self.power_on(now)?,
            PowerAction::Disable | PowerAction::Keep => {}
        }

        if self.state.stepping_allowed(now) {
            for (slot, axis) in self.axes.iter_mut().enumerate() {
                let into_switch = axis.motor.next_direction() == Some(Direction::CounterClockwise);
                if into_switch && axis.limit.is_triggered()? {
                    // Drop any momentum so release restarts from rest.
                    axis.motor.stop();
                    trace!("axis {=usize} held at limit switch", slot + 1);
                    continue;
                }
                axis.motor.run(now)?;
            }
        }

        Ok(())
    }
}
