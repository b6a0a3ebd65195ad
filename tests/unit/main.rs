//! Unit test harness for safety-stepper-array.
//!
//! This module organizes configuration tests that exercise the public API.

mod config_parsing;
mod config_validation;
