//! Constant-acceleration step ramp.
//!
//! Computes per-step intervals with David Austin's recurrence
//! ("Generate stepper-motor speed profiles in real time", 2004):
//! `c0 = 0.676 * sqrt(2 / a) * 1e6` µs, `cn = cn-1 - 2 cn-1 / (4n + 1)`,
//! floored at `1e6 / max_speed`. The ramp is re-planned after every step,
//! so the target may change at any time and the motor decelerates, reverses
//! and re-accelerates as needed.

use libm::sqrtf;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    Clockwise,
    /// Counter-clockwise (negative step count, toward the limit switch).
    CounterClockwise,
}

impl Direction {
    /// Get direction from signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Ramp state for one motor.
#[derive(Debug, Clone)]
pub struct AccelRamp {
    /// Current absolute position in steps.
    position: i64,

    /// Commanded absolute position in steps.
    target: i64,

    /// Signed speed in steps/sec (positive = clockwise).
    speed: f32,

    /// Speed ceiling in steps/sec.
    max_speed: f32,

    /// Acceleration in steps/sec².
    acceleration: f32,

    /// Interval until the next step in µs; 0 means stopped.
    step_interval_us: u32,

    /// Time of the last emitted step.
    last_step_us: Option<u64>,

    /// Ramp step counter: positive while accelerating, negative while decelerating.
    n: i64,

    /// Initial step interval in µs.
    c0: f32,

    /// Last step interval in µs.
    cn: f32,

    /// Minimum step interval in µs (at max speed).
    cmin: f32,

    /// Direction of the current move.
    direction: Direction,
}

impl AccelRamp {
    /// Create a stopped ramp at position 0.
    ///
    /// Non-positive rates are ignored and fall back to 1 step/s (1 step/s²).
    pub fn new(max_speed: f32, acceleration: f32) -> Self {
        let mut ramp = Self {
            position: 0,
            target: 0,
            speed: 0.0,
            max_speed: 1.0,
            acceleration: 1.0,
            step_interval_us: 0,
            last_step_us: None,
            n: 0,
            c0: initial_interval_us(1.0),
            cn: 0.0,
            cmin: 1_000_000.0,
            direction: Direction::Clockwise,
        };
        ramp.set_max_speed(max_speed);
        ramp.set_acceleration(acceleration);
        ramp
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Commanded absolute position.
    #[inline]
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Steps remaining to the target (signed).
    #[inline]
    pub fn distance_to_go(&self) -> i64 {
        self.target - self.position
    }

    /// Signed speed in steps/sec.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed ceiling in steps/sec.
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps/sec².
    #[inline]
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Whether the ramp has come to rest.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.step_interval_us == 0
    }

    /// Interval until the next step in µs (0 when stopped).
    #[inline]
    pub fn step_interval_us(&self) -> u32 {
        self.step_interval_us
    }

    /// Set a new absolute target.
    pub fn move_to(&mut self, target: i64) {
        if self.target != target {
            self.target = target;
            self.compute_new_speed();
        }
    }

    /// Set the speed ceiling. The sign is ignored.
    pub fn set_max_speed(&mut self, speed: f32) {
        let speed = libm::fabsf(speed);
        if speed.is_nan() || speed <= 0.0 || self.max_speed == speed {
            return;
        }
        self.max_speed = speed;
        self.cmin = 1_000_000.0 / speed;
        // Already running: recompute the ramp position for the new ceiling.
        if self.n > 0 {
            self.n = steps_to_stop(self.speed, self.acceleration);
            self.compute_new_speed();
        }
    }

    /// Set the acceleration. Non-positive values are ignored.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        if acceleration.is_nan() || acceleration <= 0.0 || self.acceleration == acceleration {
            return;
        }
        // Rescale the ramp counter so the current speed is preserved.
        self.n = (self.n as f32 * (self.acceleration / acceleration)) as i64;
        self.c0 = initial_interval_us(acceleration);
        self.acceleration = acceleration;
        self.compute_new_speed();
    }

    /// Redefine the current position; the motor stops there.
    pub fn set_position(&mut self, position: i64) {
        self.position = position;
        self.target = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    /// Direction of the next step, or `None` when stopped.
    ///
    /// Follows the sign of the speed, so while braking after a retarget it
    /// still points the old way.
    pub fn heading(&self) -> Option<Direction> {
        if self.step_interval_us == 0 {
            None
        } else if self.speed > 0.0 {
            Some(Direction::Clockwise)
        } else {
            Some(Direction::CounterClockwise)
        }
    }

    /// Direction of the step due at `now_us`, if one is due.
    pub fn step_due(&self, now_us: u64) -> Option<Direction> {
        if self.step_interval_us == 0 {
            return None;
        }
        match self.last_step_us {
            Some(last) if now_us.saturating_sub(last) < self.step_interval_us as u64 => None,
            _ => self.heading(),
        }
    }

    /// Record a step emitted at `now_us` and plan the next one.
    pub fn commit_step(&mut self, direction: Direction, now_us: u64) {
        self.position += direction.sign();
        self.last_step_us = Some(now_us);
        self.compute_new_speed();
    }

    fn compute_new_speed(&mut self) {
        let distance_to = self.distance_to_go();
        let steps_to_stop = steps_to_stop(self.speed, self.acceleration);

        if distance_to == 0 && steps_to_stop <= 1 {
            // At the target and slow enough to stop.
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance_to > 0 {
            if self.n > 0 {
                // Overshooting or heading away: start decelerating.
                if steps_to_stop >= distance_to || self.direction == Direction::CounterClockwise {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < distance_to && self.direction == Direction::Clockwise {
                self.n = -self.n;
            }
        } else if distance_to < 0 {
            if self.n > 0 {
                if steps_to_stop >= -distance_to || self.direction == Direction::Clockwise {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < -distance_to
                && self.direction == Direction::CounterClockwise
            {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from rest.
            self.cn = self.c0;
            self.direction = Direction::from_steps(distance_to);
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n + 1) as f32);
            if self.cn < self.cmin {
                self.cn = self.cmin;
            }
        }
        self.n += 1;
        self.step_interval_us = (self.cn as u32).max(1);
        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::CounterClockwise {
            self.speed = -self.speed;
        }
    }
}

#[inline]
fn initial_interval_us(acceleration: f32) -> f32 {
    // Equation 15 with the 0.676 correction for the first step.
    0.676 * sqrtf(2.0 / acceleration) * 1_000_000.0
}

#[inline]
fn steps_to_stop(speed: f32, acceleration: f32) -> i64 {
    ((speed * speed) / (2.0 * acceleration)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the ramp with a 10 µs tick until it stops; returns step timestamps.
    fn run_to_rest(ramp: &mut AccelRamp, limit_us: u64) -> std::vec::Vec<u64> {
        let mut stamps = std::vec::Vec::new();
        let mut now = 0u64;
        while now < limit_us {
            if let Some(direction) = ramp.step_due(now) {
                ramp.commit_step(direction, now);
                stamps.push(now);
            }
            if ramp.is_stopped() && ramp.distance_to_go() == 0 {
                break;
            }
            now += 10;
        }
        stamps
    }

    #[test]
    fn test_reaches_target() {
        let mut ramp = AccelRamp::new(1000.0, 2000.0);
        ramp.move_to(200);
        let stamps = run_to_rest(&mut ramp, 10_000_000);

        assert_eq!(ramp.position(), 200);
        assert!(ramp.is_stopped());
        assert!(stamps.len() >= 200);
    }

    #[test]
    fn test_reaches_negative_target() {
        let mut ramp = AccelRamp::new(800.0, 1600.0);
        ramp.set_position(50);
        ramp.move_to(-30);
        run_to_rest(&mut ramp, 10_000_000);

        assert_eq!(ramp.position(), -30);
        assert_eq!(ramp.speed(), 0.0);
    }

    #[test]
    fn test_speed_ceiling_respected() {
        let mut ramp = AccelRamp::new(500.0, 5000.0);
        ramp.move_to(1000);
        let stamps = run_to_rest(&mut ramp, 20_000_000);

        // 500 steps/s = 2000 µs; allow one tick of quantization.
        let min_gap = stamps.windows(2).map(|w| w[1] - w[0]).min().unwrap();
        assert!(min_gap >= 1_990, "min gap {} µs", min_gap);
    }

    #[test]
    fn test_accelerates_then_decelerates() {
        let mut ramp = AccelRamp::new(2000.0, 4000.0);
        ramp.move_to(400);
        let stamps = run_to_rest(&mut ramp, 10_000_000);

        let gaps: std::vec::Vec<u64> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
        let first = gaps[0];
        let middle = gaps[gaps.len() / 2];
        let last = *gaps.last().unwrap();
        assert!(middle < first);
        assert!(middle < last);
    }

    #[test]
    fn test_retarget_mid_move_reverses() {
        let mut ramp = AccelRamp::new(1000.0, 2000.0);
        ramp.move_to(500);

        let mut now = 0u64;
        while ramp.position() < 100 {
            if let Some(direction) = ramp.step_due(now) {
                ramp.commit_step(direction, now);
            }
            now += 10;
        }

        ramp.move_to(0);
        while !(ramp.is_stopped() && ramp.distance_to_go() == 0) && now < 20_000_000 {
            if let Some(direction) = ramp.step_due(now) {
                ramp.commit_step(direction, now);
            }
            now += 10;
        }
        assert_eq!(ramp.position(), 0);
    }

    #[test]
    fn test_heading_follows_speed_while_braking() {
        let mut ramp = AccelRamp::new(1000.0, 2000.0);
        assert_eq!(ramp.heading(), None);
        ramp.move_to(500);

        let mut now = 0u64;
        while ramp.position() < 100 {
            if let Some(direction) = ramp.step_due(now) {
                ramp.commit_step(direction, now);
            }
            now += 10;
        }

        // Target now lies behind, but the next steps still brake forward.
        ramp.move_to(0);
        assert!(ramp.distance_to_go() < 0);
        assert_eq!(ramp.heading(), Some(Direction::Clockwise));
    }

    #[test]
    fn test_set_position_stops() {
        let mut ramp = AccelRamp::new(1000.0, 2000.0);
        ramp.move_to(100);
        assert!(!ramp.is_stopped());

        ramp.set_position(-7);
        assert_eq!(ramp.position(), -7);
        assert_eq!(ramp.target(), -7);
        assert_eq!(ramp.distance_to_go(), 0);
        assert!(ramp.step_due(1_000_000).is_none());
    }

    #[test]
    fn test_invalid_rates_ignored() {
        let mut ramp = AccelRamp::new(1000.0, 2000.0);
        ramp.set_max_speed(0.0);
        ramp.set_acceleration(-5.0);
        assert_eq!(ramp.max_speed(), 1000.0);
        assert_eq!(ramp.acceleration(), 2000.0);

        ramp.set_max_speed(-300.0);
        assert_eq!(ramp.max_speed(), 300.0);
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::from_steps(5), Direction::Clockwise);
        assert_eq!(Direction::from_steps(-5), Direction::CounterClockwise);
        assert_eq!(Direction::CounterClockwise.sign(), -1);
    }
}
