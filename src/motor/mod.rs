//! Motor module for safety-stepper-array.
//!
//! Defines the stepping capability an array drives and the STEP/DIR driver
//! implementing it on embedded-hal pins.

mod driver;
mod stepper;

pub use driver::{StepDirStepper, DEFAULT_PULSE_WIDTH_US};
pub use stepper::Stepper;
