//! Configuration module for safety-stepper-array.
//!
//! Provides types for loading and validating array configurations from TOML
//! files (with `std` feature) or building them in code.

mod array;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use array::{
    ArrayConfig, AxisConfig, Timing, DEFAULT_CATCHUP_MS, DEFAULT_HOME_SPEED_FRACTION,
    DEFAULT_MOTION_HOLD_MS, DEFAULT_TIMEOUT_MS, MAX_AXES,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Steps, StepsPerSec, StepsPerSecSquared};
