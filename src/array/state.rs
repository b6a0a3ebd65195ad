//! Timeout and power hysteresis state machine.
//!
//! All decisions are made from [`ElapsedTimer`] readings against a clock
//! value passed in by the caller, so the machine itself is pure and can be
//! exercised with raw microsecond values.

use crate::clock::ElapsedTimer;
use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::{ArrayConfig, Timing};

/// Which set of positions the axes are chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyMode {
    /// Instructions are fresh; axes follow operator targets.
    Normal,
    /// Instructions went stale; axes retract to their safe positions.
    Safing,
}

/// Outcome of the power hysteresis evaluation for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PowerAction {
    Enable,
    Disable,
    Keep,
}

/// Per-array mutable state: power flag, mode, timers and limits.
#[derive(Debug, Clone)]
pub(crate) struct ArrayState {
    pub(crate) enabled: bool,
    pub(crate) mode: SafetyMode,
    staleness: ElapsedTimer,
    motion_hold: ElapsedTimer,
    catchup: ElapsedTimer,
    pub(crate) max_speed: StepsPerSec,
    pub(crate) max_acceleration: StepsPerSecSquared,
    pub(crate) home_speed: StepsPerSec,
    pub(crate) timing: Timing,
    pub(crate) reversed: bool,
}

impl ArrayState {
    pub(crate) fn new(config: &ArrayConfig, now_us: u64) -> Self {
        Self {
            enabled: false,
            mode: SafetyMode::Normal,
            staleness: ElapsedTimer::started_at(now_us),
            motion_hold: ElapsedTimer::started_at(now_us),
            catchup: ElapsedTimer::started_at(now_us),
            max_speed: config.max_speed,
            max_acceleration: config.max_acceleration,
            home_speed: config.effective_home_speed(),
            timing: config.timing,
            reversed: config.reversed,
        }
    }

    /// Re-evaluate NORMAL/SAFING from the staleness timer.
    pub(crate) fn update_mode(&mut self, now_us: u64) -> SafetyMode {
        let mode = if self.staleness.elapsed_ms(now_us) < self.timing.timeout_ms {
            SafetyMode::Normal
        } else {
            SafetyMode::Safing
        };

        if mode != self.mode {
            match mode {
                SafetyMode::Safing => warn!(
                    "instructions stale for {=u64} ms, retracting to safe positions",
                    self.staleness.elapsed_ms(now_us)
                ),
                SafetyMode::Normal => info!("fresh target received, resuming normal motion"),
            }
            self.mode = mode;
        }
        mode
    }

    /// Restart the motion-hold timer while anything still moves.
    pub(crate) fn note_motion(&mut self, moving: bool, now_us: u64) {
        if moving {
            self.motion_hold.reset(now_us);
        }
    }

    /// Decide the power transition for this cycle.
    ///
    /// `settled` must reflect distances after the cycle's retargeting, so
    /// a pending move always keeps power on.
    pub(crate) fn power_decision(&self, settled: bool, now_us: u64) -> PowerAction {
        let held = self.motion_hold.elapsed_ms(now_us) > self.timing.motion_hold_ms;
        if self.mode == SafetyMode::Safing && settled && held {
            PowerAction::Disable
        } else if !self.enabled {
            PowerAction::Enable
        } else {
            PowerAction::Keep
        }
    }

    /// Whether the drivers are powered and past their wake latency.
    pub(crate) fn stepping_allowed(&self, now_us: u64) -> bool {
        self.enabled && self.catchup.elapsed_ms(now_us) > self.timing.catchup_ms
    }

    /// Record a power-on.
    ///
    /// Restarts the staleness timer as well as the catch-up timer, so a
    /// self-healing re-enable while safing returns the array to NORMAL and
    /// the axes chase their operator targets for another full timeout.
    pub(crate) fn mark_enabled(&mut self, now_us: u64) {
        self.enabled = true;
        self.staleness.reset(now_us);
        self.catchup.reset(now_us);
    }

    pub(crate) fn mark_disabled(&mut self) {
        self.enabled = false;
    }

    /// Record an accepted target change.
    pub(crate) fn touch_target(&mut self, now_us: u64) {
        self.staleness.reset(now_us);
    }
}
