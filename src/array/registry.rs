//! Fixed-capacity axis arena.
//!
//! Axes are numbered from 1 in registration order at the public boundary and
//! stored 0-based. Slots are never removed, so a number stays valid for the
//! life of the array.

use core::ops::RangeInclusive;

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};
use crate::error::{ArrayError, Result};
use crate::motor::Stepper;

use super::limit::LimitSwitch;

/// One registered axis.
pub(crate) struct Axis<M: Stepper, L: InputPin> {
    /// Exclusively owned stepping capability.
    pub(crate) motor: M,
    /// Limit switch at the negative end of travel.
    pub(crate) limit: LimitSwitch<L>,
    /// Operator-requested position.
    pub(crate) target: Steps,
    /// Fallback position while instructions are stale.
    pub(crate) safe_position: Steps,
    /// Speed ceiling, never above the array maximum.
    pub(crate) max_speed: StepsPerSec,
    /// Acceleration, never above the array maximum.
    pub(crate) acceleration: StepsPerSecSquared,
}

impl<M: Stepper, L: InputPin> Axis<M, L> {
    pub(crate) fn new(
        motor: M,
        limit: L,
        max_speed: StepsPerSec,
        acceleration: StepsPerSecSquared,
    ) -> Self {
        let target = motor.current_position();
        Self {
            motor,
            limit: LimitSwitch::new(limit),
            target,
            safe_position: Steps::ZERO,
            max_speed,
            acceleration,
        }
    }

    /// Push the stored rate limits into the motor.
    pub(crate) fn apply_rates(&mut self) {
        self.motor.set_max_speed(self.max_speed);
        self.motor.set_acceleration(self.acceleration);
    }
}

/// Registered axes of one array.
pub(crate) struct AxisRegistry<M: Stepper, L: InputPin, const N: usize> {
    axes: Vec<Axis<M, L>, N>,
}

impl<M: Stepper, L: InputPin, const N: usize> AxisRegistry<M, L, N> {
    pub(crate) const fn new() -> Self {
        Self { axes: Vec::new() }
    }

    /// Append an axis; returns its 1-based number.
    pub(crate) fn push(&mut self, axis: Axis<M, L>) -> Result<usize> {
        self.axes
            .push(axis)
            .map_err(|_| ArrayError::CapacityExceeded { capacity: N })?;
        Ok(self.axes.len())
    }

    /// Number of registered axes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.axes.len()
    }

    /// Convert a 1-based axis number into a slot index.
    pub(crate) fn slot(&self, axis: usize) -> Result<usize> {
        if axis == 0 || axis > self.axes.len() {
            return Err(ArrayError::AxisOutOfRange {
                axis,
                count: self.axes.len(),
            }
            .into());
        }
        Ok(axis - 1)
    }

    /// Convert an inclusive 1-based range into slot indices.
    pub(crate) fn slots(&self, from: usize, to: usize) -> Result<RangeInclusive<usize>> {
        if from == 0 || from > to || to > self.axes.len() {
            return Err(ArrayError::InvalidRange { from, to }.into());
        }
        Ok(from - 1..=to - 1)
    }

    pub(crate) fn get(&self, axis: usize) -> Result<&Axis<M, L>> {
        let slot = self.slot(axis)?;
        Ok(&self.axes[slot])
    }

    pub(crate) fn get_mut(&mut self, axis: usize) -> Result<&mut Axis<M, L>> {
        let slot = self.slot(axis)?;
        Ok(&mut self.axes[slot])
    }

    pub(crate) fn at_mut(&mut self, slot: usize) -> &mut Axis<M, L> {
        &mut self.axes[slot]
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Axis<M, L>> {
        self.axes.iter_mut()
    }

    /// Whether any axis still has distance to go.
    pub(crate) fn any_moving(&self) -> bool {
        self.axes.iter().any(|a| a.motor.is_moving())
    }
}
