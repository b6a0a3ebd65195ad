//! Array configuration from TOML.

use heapless::{String, Vec};
use serde::Deserialize;

use super::units::{Steps, StepsPerSec, StepsPerSecSquared};

/// Fixed axis capacity of an array.
pub const MAX_AXES: usize = 16;

/// Default staleness threshold before retracting to safe positions.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Default time every axis must hold still (while safing) before power-down.
pub const DEFAULT_MOTION_HOLD_MS: u64 = 1_000;

/// Default driver wake latency masked after enabling power.
pub const DEFAULT_CATCHUP_MS: u64 = 10;

/// Home speed as a fraction of the global max speed when not configured.
pub const DEFAULT_HOME_SPEED_FRACTION: f32 = 0.3;

/// Root configuration of a stepper array.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayConfig {
    /// Global maximum speed; per-axis speeds may not exceed it.
    #[serde(rename = "max_speed_steps_per_sec")]
    pub max_speed: StepsPerSec,

    /// Global maximum acceleration; per-axis accelerations may not exceed it.
    #[serde(rename = "max_acceleration_steps_per_sec2")]
    pub max_acceleration: StepsPerSecSquared,

    /// Homing speed (defaults to 30% of max speed).
    #[serde(default, rename = "home_speed_steps_per_sec")]
    pub home_speed: Option<StepsPerSec>,

    /// Invert the direction line of every axis.
    #[serde(default)]
    pub reversed: bool,

    /// Timeout, hysteresis and catch-up intervals.
    #[serde(default)]
    pub timing: Timing,

    /// Per-axis settings, in 1-based axis order.
    #[serde(default)]
    pub axes: Vec<AxisConfig, MAX_AXES>,
}

impl ArrayConfig {
    /// Configuration with the given maxima and default everything else.
    pub fn new(max_speed: StepsPerSec, max_acceleration: StepsPerSecSquared) -> Self {
        Self {
            max_speed,
            max_acceleration,
            home_speed: None,
            reversed: false,
            timing: Timing::default(),
            axes: Vec::new(),
        }
    }

    /// Set the staleness threshold.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timing.timeout_ms = timeout_ms;
        self
    }

    /// Set the power-down hysteresis.
    pub fn with_motion_hold_ms(mut self, motion_hold_ms: u64) -> Self {
        self.timing.motion_hold_ms = motion_hold_ms;
        self
    }

    /// Set the post-enable catch-up interval.
    pub fn with_catchup_ms(mut self, catchup_ms: u64) -> Self {
        self.timing.catchup_ms = catchup_ms;
        self
    }

    /// Set the homing speed.
    pub fn with_home_speed(mut self, home_speed: StepsPerSec) -> Self {
        self.home_speed = Some(home_speed);
        self
    }

    /// Home speed to start with.
    pub fn effective_home_speed(&self) -> StepsPerSec {
        self.home_speed
            .unwrap_or(self.max_speed * DEFAULT_HOME_SPEED_FRACTION)
    }

    /// Get an axis configuration by name.
    pub fn axis(&self, name: &str) -> Option<&AxisConfig> {
        self.axes.iter().find(|a| a.name.as_str() == name)
    }

    /// 1-based axis number of a named axis.
    pub fn axis_number(&self, name: &str) -> Option<usize> {
        self.axes
            .iter()
            .position(|a| a.name.as_str() == name)
            .map(|i| i + 1)
    }

    /// List all axis names in numbering order.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.name.as_str())
    }
}

/// Timer thresholds, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Timing {
    /// Time without a target change before axes retract to safe positions.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Time all axes must hold still while safing before power is cut.
    #[serde(default = "default_motion_hold_ms")]
    pub motion_hold_ms: u64,

    /// Delay after enabling power before stepping resumes.
    #[serde(default = "default_catchup_ms")]
    pub catchup_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_motion_hold_ms() -> u64 {
    DEFAULT_MOTION_HOLD_MS
}

fn default_catchup_ms() -> u64 {
    DEFAULT_CATCHUP_MS
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            motion_hold_ms: DEFAULT_MOTION_HOLD_MS,
            catchup_ms: DEFAULT_CATCHUP_MS,
        }
    }
}

/// Settings for one axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Fallback position commanded when instructions go stale.
    #[serde(default)]
    pub safe_position: Steps,

    /// Per-axis speed override.
    #[serde(default, rename = "max_speed_steps_per_sec")]
    pub max_speed: Option<StepsPerSec>,

    /// Per-axis acceleration override.
    #[serde(default, rename = "acceleration_steps_per_sec2")]
    pub acceleration: Option<StepsPerSecSquared>,
}
