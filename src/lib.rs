//! # safety-stepper-array
//!
//! Fail-safe coordination of an array of stepper axes sharing one driver
//! power rail, with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Staleness timeout**: axes retract to per-axis safe positions when
//!   targets stop changing
//! - **Power hysteresis**: drivers are powered down only after every axis
//!   has held still, and powered back up as soon as there is work
//! - **Limit switch inhibition**: an axis at its switch is never driven
//!   further into it
//! - **Homing**: a re-entrant step function plus a blocking wrapper
//! - **Injectable clock**: deterministic simulation with [`SimClock`]
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use safety_stepper_array::{StdClock, StepperArray, Steps};
//!
//! let config = safety_stepper_array::load_config("array.toml")?;
//! let mut array = StepperArray::new(wake_pin, enable_pin, StdClock::new(), config)?;
//!
//! array.register_step_dir(step_pin, dir_pin, delay, limit_pin)?;
//! array.initialize()?;
//! array.home_all(5_000)?;
//!
//! array.set_target_position(1, Steps(1200))?;
//! loop {
//!     array.poll()?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and [`StdClock`]
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// Core modules
pub mod array;
pub mod clock;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod sim;

// Re-exports for ergonomic API
pub use array::{HomingStatus, LimitSwitch, PowerRail, SafetyMode, StepperArray};
pub use clock::{Clock, ElapsedTimer, SimClock};
pub use config::{validate_config, ArrayConfig, AxisConfig, Timing, MAX_AXES};
pub use error::{Error, Result};
pub use motion::{AccelRamp, Direction};
pub use motor::{StepDirStepper, Stepper};

#[cfg(feature = "std")]
pub use clock::StdClock;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Steps, StepsPerSec, StepsPerSecSquared, UnitExt};
