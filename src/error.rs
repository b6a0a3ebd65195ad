//! Error types for safety-stepper-array.
//!
//! Every fallible operation leaves the array untouched when it returns `Err`.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all safety-stepper-array operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Array registration, addressing or parameter error
    Array(ArrayError),
    /// Motor operation error
    Motor(MotorError),
    /// Homing procedure error
    Homing(HomingError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Global max speed must be > 0
    InvalidMaxSpeed(f32),
    /// Global max acceleration must be > 0
    InvalidMaxAcceleration(f32),
    /// Home speed must be in (0, max speed]
    InvalidHomeSpeed {
        /// Configured home speed
        requested: f32,
        /// Global max speed
        max: f32,
    },
    /// Per-axis speed override outside (0, max speed]
    AxisSpeedExceedsLimit {
        /// Axis name
        axis: heapless::String<32>,
        /// Configured speed
        requested: f32,
        /// Global max speed
        max: f32,
    },
    /// Per-axis acceleration override outside (0, max acceleration]
    AxisAccelerationExceedsLimit {
        /// Axis name
        axis: heapless::String<32>,
        /// Configured acceleration
        requested: f32,
        /// Global max acceleration
        max: f32,
    },
    /// Safe positions must be >= 0
    NegativeSafePosition {
        /// Axis name
        axis: heapless::String<32>,
        /// Configured safe position
        position: i64,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Array registration, addressing and parameter errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayError {
    /// Every axis slot is taken
    CapacityExceeded {
        /// Fixed capacity of the array
        capacity: usize,
    },
    /// Axis number outside 1..=count
    AxisOutOfRange {
        /// Requested 1-based axis number
        axis: usize,
        /// Number of registered axes
        count: usize,
    },
    /// Homing range is empty or out of bounds
    InvalidRange {
        /// First axis (1-based, inclusive)
        from: usize,
        /// Last axis (1-based, inclusive)
        to: usize,
    },
    /// Requested speed exceeds the global maximum
    SpeedExceedsLimit {
        /// Requested speed
        requested: f32,
        /// Global max speed
        max: f32,
    },
    /// Requested acceleration exceeds the global maximum
    AccelerationExceedsLimit {
        /// Requested acceleration
        requested: f32,
        /// Global max acceleration
        max: f32,
    },
    /// Speeds and accelerations must be > 0
    InvalidRate(f32),
    /// Safe positions must be >= 0
    NegativeSafePosition(i64),
    /// Wake or enable line write failed
    PowerPin,
    /// Limit switch read failed
    LimitSwitchPin,
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// STEP or DIR pin operation failed
    PinError,
}

/// Homing errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HomingError {
    /// Deadline elapsed before every axis in range reached its switch
    Timeout {
        /// Deadline that elapsed
        timeout_ms: u64,
    },
    /// A homing session is active
    InProgress,
    /// No homing session to advance
    NotStarted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Array(e) => write!(f, "Array error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Homing(e) => write!(f, "Homing error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidHomeSpeed { requested, max } => {
                write!(f, "Invalid home speed: {}. Must be in (0, {}]", requested, max)
            }
            ConfigError::AxisSpeedExceedsLimit { axis, requested, max } => {
                write!(f, "Axis '{}' speed {} outside (0, {}]", axis, requested, max)
            }
            ConfigError::AxisAccelerationExceedsLimit { axis, requested, max } => {
                write!(f, "Axis '{}' acceleration {} outside (0, {}]", axis, requested, max)
            }
            ConfigError::NegativeSafePosition { axis, position } => {
                write!(f, "Axis '{}' safe position {} is negative", axis, position)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayError::CapacityExceeded { capacity } => {
                write!(f, "All {} axis slots are in use", capacity)
            }
            ArrayError::AxisOutOfRange { axis, count } => {
                write!(f, "Axis {} out of range 1..={}", axis, count)
            }
            ArrayError::InvalidRange { from, to } => write!(f, "Invalid axis range {}..={}", from, to),
            ArrayError::SpeedExceedsLimit { requested, max } => {
                write!(f, "Requested speed {} exceeds maximum {}", requested, max)
            }
            ArrayError::AccelerationExceedsLimit { requested, max } => {
                write!(f, "Requested acceleration {} exceeds maximum {}", requested, max)
            }
            ArrayError::InvalidRate(v) => write!(f, "Rate {} must be > 0", v),
            ArrayError::NegativeSafePosition(p) => write!(f, "Safe position {} is negative", p),
            ArrayError::PowerPin => write!(f, "Power control pin operation failed"),
            ArrayError::LimitSwitchPin => write!(f, "Limit switch read failed"),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for HomingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomingError::Timeout { timeout_ms } => {
                write!(f, "Limit switches not reached within {} ms", timeout_ms)
            }
            HomingError::InProgress => write!(f, "Homing in progress"),
            HomingError::NotStarted => write!(f, "No homing session started"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ArrayError> for Error {
    fn from(e: ArrayError) -> Self {
        Error::Array(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<HomingError> for Error {
    fn from(e: HomingError) -> Self {
        Error::Homing(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ArrayError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for HomingError {}
