//! Homing against the limit switches.
//!
//! Homing is a session: [`StepperArray::begin_homing`] points a range of axes
//! at a far negative target, then every [`StepperArray::poll_homing`] call
//! gives each axis whose switch is still open one chance to step. The session
//! ends when every switch in the range is pressed (positions are zeroed) or
//! the deadline passes (nothing is zeroed). [`StepperArray::home`] wraps the
//! session in a blocking loop.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::{Clock, ElapsedTimer};
use crate::config::units::Steps;
use crate::error::{HomingError, Result};
use crate::motor::Stepper;

use super::StepperArray;

/// Far enough past any real travel that no axis reaches it before its switch.
const HOMING_TARGET: Steps = Steps(-1_000_000_000);

/// Result of one homing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingStatus {
    /// At least one switch in range is still open.
    InProgress,
    /// Every switch in range is pressed; positions are now zero.
    Homed,
    /// The deadline passed first; positions are unchanged.
    TimedOut,
}

/// Active homing session over slots `first..=last`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HomingSession {
    first: usize,
    last: usize,
    timeout_ms: u64,
    timer: ElapsedTimer,
}

impl<M, L, WAKE, EN, C, const N: usize> StepperArray<M, L, WAKE, EN, C, N>
where
    M: Stepper,
    L: InputPin,
    WAKE: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    /// Start homing axes `from..=to` (1-based, inclusive).
    ///
    /// Powers the drivers on if they were off and sends each axis in range
    /// toward its switch at the home speed. [`poll`](Self::poll) is refused
    /// until the session resolves.
    pub fn begin_homing(&mut self, from: usize, to: usize, timeout_ms: u64) -> Result<()> {
        self.ensure_idle()?;
        let slots = self.axes.slots(from, to)?;
        let now = self.clock.now_micros();

        if !self.state.enabled {
            self.power_on(now)?;
        }

        let home_speed = self.state.home_speed;
        let max_acceleration = self.state.max_acceleration;
        for slot in slots.clone() {
            let axis = self.axes.at_mut(slot);
            axis.motor.set_max_speed(home_speed);
            axis.motor.set_acceleration(max_acceleration);
            axis.motor.move_to(HOMING_TARGET);
        }

        self.homing = Some(HomingSession {
            first: *slots.start(),
            last: *slots.end(),
            timeout_ms,
            timer: ElapsedTimer::started_at(now),
        });
        info!(
            "homing axes {=usize}..={=usize}, deadline {=u64} ms",
            from, to, timeout_ms
        );
        Ok(())
    }

    /// Advance the active homing session by one cycle.
    ///
    /// A pin failure aborts the session without zeroing anything.
    pub fn poll_homing(&mut self) -> Result<HomingStatus> {
        let Some(session) = self.homing else {
            return Err(HomingError::NotStarted.into());
        };

        match self.step_homing(session) {
            Ok(status) => Ok(status),
            Err(e) => {
                self.stop_homing(session);
                Err(e)
            }
        }
    }

    /// Home axes `from..=to`, blocking until every switch is pressed or
    /// `timeout_ms` elapses.
    ///
    /// Must not be interleaved with [`poll`](Self::poll).
    pub fn home(&mut self, from: usize, to: usize, timeout_ms: u64) -> Result<()> {
        self.begin_homing(from, to, timeout_ms)?;
        loop {
            match self.poll_homing()? {
                HomingStatus::InProgress => {}
                HomingStatus::Homed => return Ok(()),
                HomingStatus::TimedOut => return Err(HomingError::Timeout { timeout_ms }.into()),
            }
        }
    }

    /// Home every registered axis.
    pub fn home_all(&mut self, timeout_ms: u64) -> Result<()> {
        self.home(1, self.axes.len(), timeout_ms)
    }

    fn step_homing(&mut self, session: HomingSession) -> Result<HomingStatus> {
        let now = self.clock.now_micros();
        let stepping = self.state.stepping_allowed(now);

        let mut all_home = true;
        for slot in session.first..=session.last {
            let axis = self.axes.at_mut(slot);
            if axis.limit.is_triggered()? {
                axis.motor.stop();
                continue;
            }
            all_home = false;
            // Re-aim an axis whose switch released after it was stopped.
            axis.motor.move_to(HOMING_TARGET);
            if stepping {
                axis.motor.run(now)?;
            }
        }

        if all_home {
            let max_speed = self.state.max_speed;
            for slot in session.first..=session.last {
                let axis = self.axes.at_mut(slot);
                axis.motor.set_current_position(Steps::ZERO);
                axis.target = Steps::ZERO;
                axis.max_speed = max_speed;
                axis.apply_rates();
            }
            self.state.touch_target(now);
            self.homing = None;
            info!("homing complete");
            return Ok(HomingStatus::Homed);
        }

        if session.timer.elapsed_ms(now) >= session.timeout_ms {
            warn!("homing timed out after {=u64} ms", session.timeout_ms);
            self.stop_homing(session);
            return Ok(HomingStatus::TimedOut);
        }

        Ok(HomingStatus::InProgress)
    }

    /// End a session without zeroing: restore rates and stop every axis
    /// where it stands.
    fn stop_homing(&mut self, session: HomingSession) {
        for slot in session.first..=session.last {
            let axis = self.axes.at_mut(slot);
            axis.apply_rates();
            axis.motor.stop();
        }
        self.homing = None;
    }
}
