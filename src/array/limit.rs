//! Limit switch input.

use embedded_hal::digital::InputPin;

use crate::error::{ArrayError, Result};

/// A pulled-up, normally-open limit switch: the line reads low when triggered.
///
/// The pull-up itself is configured by the HAL when the input pin is created.
#[derive(Debug)]
pub struct LimitSwitch<L: InputPin> {
    pin: L,
}

impl<L: InputPin> LimitSwitch<L> {
    /// Wrap an input pin.
    pub fn new(pin: L) -> Self {
        Self { pin }
    }

    /// Whether the switch is currently pressed.
    pub fn is_triggered(&mut self) -> Result<bool> {
        self.pin
            .is_low()
            .map_err(|_| ArrayError::LimitSwitchPin.into())
    }

    /// Release the pin.
    pub fn release(self) -> L {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn test_low_reads_triggered() {
        let pin = PinMock::new(&[
            Transaction::get(State::High),
            Transaction::get(State::Low),
        ]);
        let mut switch = LimitSwitch::new(pin);

        assert!(!switch.is_triggered().unwrap());
        assert!(switch.is_triggered().unwrap());

        switch.release().done();
    }
}
