//! Motion module for safety-stepper-array.
//!
//! Provides the acceleration ramp that times individual steps.

mod ramp;

pub use ramp::{AccelRamp, Direction};
