//! Monotonic time sources and elapsed-time timers.
//!
//! The array never reads ambient time. Every timer is a plain value holding
//! the instant it was last reset, and the current reading is passed in from
//! a [`Clock`] owned by the array. Tests drive a [`SimClock`] by hand.

use core::cell::Cell;

/// A monotonic, non-decreasing microsecond time source.
pub trait Clock {
    /// Microseconds elapsed since a clock-specific reference point.
    fn now_micros(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

/// Resettable elapsed-time timer.
///
/// Stores the instant of the last reset; elapsed time is computed against a
/// clock reading supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedTimer {
    started_at_us: u64,
}

impl ElapsedTimer {
    /// Create a timer started at `now_us`.
    #[inline]
    pub const fn started_at(now_us: u64) -> Self {
        Self {
            started_at_us: now_us,
        }
    }

    /// Restart the timer from zero.
    #[inline]
    pub fn reset(&mut self, now_us: u64) {
        self.started_at_us = now_us;
    }

    /// Whole milliseconds elapsed since the last reset.
    #[inline]
    pub fn elapsed_ms(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.started_at_us) / 1_000
    }
}

/// Clock backed by the operating system's monotonic clock.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    created_at: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose reference point is now.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self {
            created_at: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_micros(&self) -> u64 {
        self.created_at.elapsed().as_micros() as u64
    }
}

/// Manually driven clock for simulation and tests.
///
/// Time only moves when told to, either explicitly or by a fixed amount on
/// every reading (useful to let blocking loops reach their deadline).
#[derive(Debug, Default)]
pub struct SimClock {
    now_us: Cell<u64>,
    auto_advance_us: Cell<u64>,
}

impl SimClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `us` microseconds on every reading.
    pub fn with_auto_advance_us(self, us: u64) -> Self {
        self.auto_advance_us.set(us);
        self
    }

    /// Jump to an absolute time in milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.now_us.set(ms * 1_000);
    }

    /// Advance by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1_000);
    }

    /// Advance by `us` microseconds.
    pub fn advance_us(&self, us: u64) {
        self.now_us.set(self.now_us.get() + us);
    }

    /// Current reading without auto-advance.
    pub fn peek_micros(&self) -> u64 {
        self.now_us.get()
    }
}

impl Clock for SimClock {
    fn now_micros(&self) -> u64 {
        let now = self.now_us.get();
        self.now_us.set(now + self.auto_advance_us.get());
        now
    }
}
