//! Motor-driver power gating.

use embedded_hal::digital::OutputPin;

use crate::error::{ArrayError, Result};

/// The shared wake and enable lines of every driver in the array.
///
/// Wake is active-high, enable is active-low. Both are always switched
/// together.
pub struct PowerRail<WAKE, EN>
where
    WAKE: OutputPin,
    EN: OutputPin,
{
    wake_pin: WAKE,
    enable_pin: EN,
}

impl<WAKE, EN> PowerRail<WAKE, EN>
where
    WAKE: OutputPin,
    EN: OutputPin,
{
    /// Take ownership of the wake (sleep) and enable lines.
    pub fn new(wake_pin: WAKE, enable_pin: EN) -> Self {
        Self {
            wake_pin,
            enable_pin,
        }
    }

    /// Wake the drivers and enable their outputs.
    pub fn enable(&mut self) -> Result<()> {
        self.wake_pin.set_high().map_err(|_| ArrayError::PowerPin)?;
        self.enable_pin.set_low().map_err(|_| ArrayError::PowerPin)?;
        Ok(())
    }

    /// Disable the driver outputs and put the drivers to sleep.
    pub fn disable(&mut self) -> Result<()> {
        self.wake_pin.set_low().map_err(|_| ArrayError::PowerPin)?;
        self.enable_pin.set_high().map_err(|_| ArrayError::PowerPin)?;
        Ok(())
    }

    /// Release the pins.
    pub fn release(self) -> (WAKE, EN) {
        (self.wake_pin, self.enable_pin)
    }
}
