//! The safety stepper array.
//!
//! A [`StepperArray`] owns up to `N` axes sharing one power rail. The caller
//! sets targets whenever it likes and calls [`StepperArray::poll`] from its
//! control loop; the array decides whether each axis chases its operator
//! target or retracts to its safe position, gates driver power, and refuses
//! to drive an axis further into a pressed limit switch.
//!
//! ```rust,ignore
//! let config = parse_config(include_str!("array.toml"))?;
//! let mut array = StepperArray::new(wake, enable, StdClock::new(), config)?;
//! array.register_step_dir(step0, dir0, delay, limit0)?;
//! array.initialize()?;
//! array.home_all(5_000)?;
//!
//! loop {
//!     if let Some(target) = link.next_target() {
//!         array.set_target_position(1, target)?;
//!     }
//!     array.poll()?;
//! }
//! ```

mod homing;
mod limit;
mod power;
mod registry;
mod runner;
mod state;

pub use homing::HomingStatus;
pub use limit::LimitSwitch;
pub use power::PowerRail;
pub use state::SafetyMode;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use crate::clock::Clock;
use crate::config::units::{Steps, StepsPerSec, StepsPerSecSquared};
use crate::config::{validate_config, ArrayConfig, AxisConfig, MAX_AXES};
use crate::error::{ArrayError, HomingError, Result};
use crate::motor::{StepDirStepper, Stepper};

use homing::HomingSession;
use registry::{Axis, AxisRegistry};
use state::ArrayState;

/// An array of stepper axes behind one wake/enable power rail.
///
/// Generic over:
/// - `M`: the motor-stepping capability of every axis
/// - `L`: limit switch input pin type
/// - `WAKE`, `EN`: the shared power lines
/// - `C`: time source
/// - `N`: axis capacity (defaults to [`MAX_AXES`])
pub struct StepperArray<M, L, WAKE, EN, C, const N: usize = MAX_AXES>
where
    M: Stepper,
    L: InputPin,
    WAKE: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    axes: AxisRegistry<M, L, N>,
    power: PowerRail<WAKE, EN>,
    state: ArrayState,
    configured: Vec<AxisConfig, MAX_AXES>,
    homing: Option<HomingSession>,
    clock: C,
}

impl<M, L, WAKE, EN, C, const N: usize> StepperArray<M, L, WAKE, EN, C, N>
where
    M: Stepper,
    L: InputPin,
    WAKE: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    /// Create an empty array.
    ///
    /// Power lines are left untouched until [`initialize`](Self::initialize).
    /// Axes listed in `config` are applied, in order, as axes register.
    pub fn new(wake_pin: WAKE, enable_pin: EN, clock: C, config: ArrayConfig) -> Result<Self> {
        validate_config(&config)?;
        let state = ArrayState::new(&config, clock.now_micros());

        Ok(Self {
            axes: AxisRegistry::new(),
            power: PowerRail::new(wake_pin, enable_pin),
            state,
            configured: config.axes,
            homing: None,
            clock,
        })
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Register an axis; returns its 1-based number.
    ///
    /// The motor gets the global maxima (or its configured overrides) and the
    /// array's current direction polarity.
    pub fn register(&mut self, motor: M, limit: L) -> Result<usize> {
        if self.axes.len() >= N {
            return Err(ArrayError::CapacityExceeded { capacity: N }.into());
        }

        let mut axis = Axis::new(motor, limit, self.state.max_speed, self.state.max_acceleration);
        if let Some(config) = self.configured.get(self.axes.len()) {
            Self::configure_axis(&mut axis, config);
        }
        axis.apply_rates();
        axis.motor.set_pins_inverted(self.state.reversed, false);

        let number = self.axes.push(axis)?;
        debug!("registered axis {=usize}", number);
        Ok(number)
    }

    /// Reset every axis to the global maxima (plus configured overrides),
    /// apply the configured polarity and power the drivers on.
    pub fn initialize(&mut self) -> Result<()> {
        let (max_speed, max_acceleration) = (self.state.max_speed, self.state.max_acceleration);
        for (slot, axis) in self.axes.iter_mut().enumerate() {
            axis.max_speed = max_speed;
            axis.acceleration = max_acceleration;
            if let Some(config) = self.configured.get(slot) {
                Self::configure_axis(axis, config);
            }
            axis.apply_rates();
        }
        self.set_reversed(self.state.reversed);

        let now = self.clock.now_micros();
        self.power_on(now)?;
        info!("array initialized with {=usize} axes", self.axes.len());
        Ok(())
    }

    // =========================================================================
    // Parameter control
    // =========================================================================

    /// Set an axis's operator target.
    ///
    /// Returns `Ok(true)` and restarts the staleness timer when the target
    /// actually changed; `Ok(false)` when it already held `position`.
    pub fn set_target_position(&mut self, axis: usize, position: Steps) -> Result<bool> {
        let entry = self.axes.get_mut(axis)?;
        if entry.target == position {
            return Ok(false);
        }
        entry.target = position;
        let now = self.clock.now_micros();
        self.state.touch_target(now);
        Ok(true)
    }

    /// Set an axis's speed ceiling.
    pub fn set_speed(&mut self, axis: usize, speed: StepsPerSec) -> Result<()> {
        self.ensure_idle()?;
        self.check_speed(speed)?;
        let entry = self.axes.get_mut(axis)?;
        entry.max_speed = speed;
        entry.motor.set_max_speed(speed);
        Ok(())
    }

    /// Set an axis's acceleration.
    pub fn set_acceleration(&mut self, axis: usize, acceleration: StepsPerSecSquared) -> Result<()> {
        self.ensure_idle()?;
        self.check_acceleration(acceleration)?;
        let entry = self.axes.get_mut(axis)?;
        entry.acceleration = acceleration;
        entry.motor.set_acceleration(acceleration);
        Ok(())
    }

    /// Set the position an axis retracts to when instructions go stale.
    pub fn set_safe_position(&mut self, axis: usize, position: Steps) -> Result<()> {
        if position.is_negative() {
            return Err(ArrayError::NegativeSafePosition(position.0).into());
        }
        self.axes.get_mut(axis)?.safe_position = position;
        Ok(())
    }

    /// Set the speed used by homing.
    pub fn set_home_speed(&mut self, speed: StepsPerSec) -> Result<()> {
        self.ensure_idle()?;
        self.check_speed(speed)?;
        self.state.home_speed = speed;
        Ok(())
    }

    /// Set how long targets may stay unchanged before axes retract.
    pub fn set_timeout_threshold(&mut self, timeout_ms: u64) {
        self.state.timing.timeout_ms = timeout_ms;
    }

    /// Invert the direction line of every axis. Limit switches are unaffected.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.state.reversed = reversed;
        for axis in self.axes.iter_mut() {
            axis.motor.set_pins_inverted(reversed, false);
        }
    }

    /// Apply one configured axis (safe position and rate overrides).
    ///
    /// Everything is checked before anything is changed.
    pub fn apply_axis_config(&mut self, axis: usize, config: &AxisConfig) -> Result<()> {
        self.ensure_idle()?;
        self.axes.slot(axis)?;
        if config.safe_position.is_negative() {
            return Err(ArrayError::NegativeSafePosition(config.safe_position.0).into());
        }
        if let Some(speed) = config.max_speed {
            self.check_speed(speed)?;
        }
        if let Some(acceleration) = config.acceleration {
            self.check_acceleration(acceleration)?;
        }

        let entry = self.axes.get_mut(axis)?;
        Self::configure_axis(entry, config);
        entry.apply_rates();
        Ok(())
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Position of an axis as counted by its motor.
    pub fn current_position(&self, axis: usize) -> Result<Steps> {
        Ok(self.axes.get(axis)?.motor.current_position())
    }

    /// Operator target of an axis.
    pub fn target_position(&self, axis: usize) -> Result<Steps> {
        Ok(self.axes.get(axis)?.target)
    }

    /// Safe position of an axis.
    pub fn safe_position(&self, axis: usize) -> Result<Steps> {
        Ok(self.axes.get(axis)?.safe_position)
    }

    /// Borrow the motor of an axis.
    pub fn motor(&self, axis: usize) -> Result<&M> {
        Ok(&self.axes.get(axis)?.motor)
    }

    /// Whether the drivers are powered.
    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    /// Whether every limit switch is pressed.
    pub fn is_home(&mut self) -> Result<bool> {
        for axis in self.axes.iter_mut() {
            if !axis.limit.is_triggered()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Mode chosen by the most recent poll.
    pub fn mode(&self) -> SafetyMode {
        self.state.mode
    }

    /// Number of registered axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Maximum number of axes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Current homing speed.
    pub fn home_speed(&self) -> StepsPerSec {
        self.state.home_speed
    }

    /// Whether a homing session is in progress.
    pub fn is_homing(&self) -> bool {
        self.homing.is_some()
    }

    /// Cut driver power and halt forever.
    ///
    /// There is no way back short of restarting the process.
    pub fn emergency_stop(&mut self) -> ! {
        error!("emergency stop");
        // Nothing left to report a pin failure to.
        let _ = self.power.disable();
        self.state.mark_disabled();
        self.homing = None;
        loop {
            #[cfg(feature = "std")]
            std::thread::sleep(std::time::Duration::from_secs(1));
            #[cfg(not(feature = "std"))]
            core::hint::spin_loop();
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn power_on(&mut self, now_us: u64) -> Result<()> {
        self.power.enable()?;
        self.state.mark_enabled(now_us);
        info!("driver power on");
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        self.power.disable()?;
        self.state.mark_disabled();
        info!("driver power off");
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.homing.is_some() {
            return Err(HomingError::InProgress.into());
        }
        Ok(())
    }

    fn check_speed(&self, speed: StepsPerSec) -> Result<()> {
        if speed.0.is_nan() || speed.0 <= 0.0 {
            return Err(ArrayError::InvalidRate(speed.0).into());
        }
        if speed > self.state.max_speed {
            return Err(ArrayError::SpeedExceedsLimit {
                requested: speed.0,
                max: self.state.max_speed.0,
            }
            .into());
        }
        Ok(())
    }

    fn check_acceleration(&self, acceleration: StepsPerSecSquared) -> Result<()> {
        if acceleration.0.is_nan() || acceleration.0 <= 0.0 {
            return Err(ArrayError::InvalidRate(acceleration.0).into());
        }
        if acceleration > self.state.max_acceleration {
            return Err(ArrayError::AccelerationExceedsLimit {
                requested: acceleration.0,
                max: self.state.max_acceleration.0,
            }
            .into());
        }
        Ok(())
    }

    /// Copy a validated axis configuration onto an axis without touching the motor.
    fn configure_axis(axis: &mut Axis<M, L>, config: &AxisConfig) {
        axis.safe_position = config.safe_position;
        if let Some(speed) = config.max_speed {
            axis.max_speed = speed;
        }
        if let Some(acceleration) = config.acceleration {
            axis.acceleration = acceleration;
        }
    }
}

impl<STEP, DIR, DELAY, L, WAKE, EN, C, const N: usize>
    StepperArray<StepDirStepper<STEP, DIR, DELAY>, L, WAKE, EN, C, N>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    L: InputPin,
    WAKE: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    /// Register an axis driven through STEP/DIR pins.
    pub fn register_step_dir(
        &mut self,
        step_pin: STEP,
        dir_pin: DIR,
        delay: DELAY,
        limit: L,
    ) -> Result<usize> {
        self.register(StepDirStepper::new(step_pin, dir_pin, delay), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::error::Error;
    use crate::sim::{SimPin, SimStepper, SimSwitch};
    use core::cell::Cell;

    type SimArray<'a> =
        StepperArray<SimStepper, SimSwitch<'a>, SimPin<'a>, SimPin<'a>, &'a SimClock, 4>;

    struct Bench {
        clock: SimClock,
        wake: Cell<bool>,
        enable: Cell<bool>,
        switches: [Cell<bool>; 4],
    }

    impl Bench {
        fn new() -> Self {
            Self {
                clock: SimClock::new(),
                wake: Cell::new(false),
                enable: Cell::new(true),
                switches: Default::default(),
            }
        }

        fn array(&self, config: ArrayConfig) -> SimArray<'_> {
            StepperArray::new(
                SimPin::new(&self.wake),
                SimPin::new(&self.enable),
                &self.clock,
                config,
            )
            .unwrap()
        }
    }

    fn config() -> ArrayConfig {
        ArrayConfig::new(StepsPerSec(1000.0), StepsPerSecSquared(2000.0))
    }

    #[test]
    fn test_register_applies_maxima() {
        let bench = Bench::new();
        let mut array = bench.array(config());

        let axis = array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();
        assert_eq!(axis, 1);
        assert_eq!(array.motor(1).unwrap().max_speed(), StepsPerSec(1000.0));
        assert_eq!(
            array.motor(1).unwrap().acceleration(),
            StepsPerSecSquared(2000.0)
        );
    }

    #[test]
    fn test_capacity_exceeded_leaves_count() {
        let extra = Cell::new(false);
        let bench = Bench::new();
        let mut array = bench.array(config());
        for switch in &bench.switches {
            array.register(SimStepper::new(), SimSwitch::new(switch)).unwrap();
        }

        assert_eq!(
            array.register(SimStepper::new(), SimSwitch::new(&extra)),
            Err(Error::Array(ArrayError::CapacityExceeded { capacity: 4 }))
        );
        assert_eq!(array.axis_count(), 4);
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn test_initialize_powers_on() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        assert!(!array.is_enabled());
        array.initialize().unwrap();
        assert!(array.is_enabled());
        assert!(bench.wake.get());
        assert!(!bench.enable.get());
    }

    #[test]
    fn test_set_target_reports_change() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        assert!(array.set_target_position(1, Steps(100)).unwrap());
        assert!(!array.set_target_position(1, Steps(100)).unwrap());
        assert_eq!(array.target_position(1).unwrap(), Steps(100));
        assert!(array.set_target_position(2, Steps(1)).is_err());
        assert!(array.set_target_position(0, Steps(1)).is_err());
    }

    #[test]
    fn test_rate_setters_reject_without_mutation() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        assert!(matches!(
            array.set_speed(1, StepsPerSec(1000.5)),
            Err(Error::Array(ArrayError::SpeedExceedsLimit { .. }))
        ));
        assert!(matches!(
            array.set_speed(1, StepsPerSec(0.0)),
            Err(Error::Array(ArrayError::InvalidRate(_)))
        ));
        assert_eq!(array.motor(1).unwrap().max_speed(), StepsPerSec(1000.0));

        assert!(matches!(
            array.set_acceleration(1, StepsPerSecSquared(2001.0)),
            Err(Error::Array(ArrayError::AccelerationExceedsLimit { .. }))
        ));
        assert_eq!(
            array.motor(1).unwrap().acceleration(),
            StepsPerSecSquared(2000.0)
        );

        array.set_speed(1, StepsPerSec(1000.0)).unwrap();
        array.set_acceleration(1, StepsPerSecSquared(500.0)).unwrap();
        assert_eq!(
            array.motor(1).unwrap().acceleration(),
            StepsPerSecSquared(500.0)
        );
    }

    #[test]
    fn test_safe_position_and_home_speed_checks() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        assert!(array.set_safe_position(1, Steps(-1)).is_err());
        array.set_safe_position(1, Steps(40)).unwrap();
        assert_eq!(array.safe_position(1).unwrap(), Steps(40));

        assert!(array.set_home_speed(StepsPerSec(2000.0)).is_err());
        assert_eq!(array.home_speed(), StepsPerSec(300.0));
        array.set_home_speed(StepsPerSec(800.0)).unwrap();
        assert_eq!(array.home_speed(), StepsPerSec(800.0));
    }

    #[test]
    fn test_reversed_flips_direction_only() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        array.set_reversed(true);
        assert!(array.motor(1).unwrap().direction_inverted());
        assert!(!array.motor(1).unwrap().step_inverted());

        // Axes registered later pick up the current polarity.
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[1]))
            .unwrap();
        assert!(array.motor(2).unwrap().direction_inverted());
    }

    #[test]
    fn test_configured_axes_applied_on_register() {
        let bench = Bench::new();
        let mut config = config();
        config
            .axes
            .push(AxisConfig {
                name: heapless::String::try_from("lift").unwrap(),
                safe_position: Steps(120),
                max_speed: Some(StepsPerSec(400.0)),
                acceleration: None,
            })
            .unwrap();
        let mut array = bench.array(config);

        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[1]))
            .unwrap();

        assert_eq!(array.safe_position(1).unwrap(), Steps(120));
        assert_eq!(array.motor(1).unwrap().max_speed(), StepsPerSec(400.0));
        assert_eq!(array.safe_position(2).unwrap(), Steps::ZERO);
        assert_eq!(array.motor(2).unwrap().max_speed(), StepsPerSec(1000.0));

        array.initialize().unwrap();
        assert_eq!(array.motor(1).unwrap().max_speed(), StepsPerSec(400.0));
    }

    #[test]
    fn test_apply_axis_config_checks_first() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        array
            .register(SimStepper::new(), SimSwitch::new(&bench.switches[0]))
            .unwrap();

        let bad = AxisConfig {
            name: heapless::String::try_from("x").unwrap(),
            safe_position: Steps(10),
            max_speed: Some(StepsPerSec(500.0)),
            acceleration: Some(StepsPerSecSquared(9000.0)),
        };
        assert!(array.apply_axis_config(1, &bad).is_err());
        assert_eq!(array.safe_position(1).unwrap(), Steps::ZERO);
        assert_eq!(array.motor(1).unwrap().max_speed(), StepsPerSec(1000.0));
    }

    #[test]
    fn test_is_home_requires_every_switch() {
        let bench = Bench::new();
        let mut array = bench.array(config());
        for switch in &bench.switches[..2] {
            array.register(SimStepper::new(), SimSwitch::new(switch)).unwrap();
        }

        assert!(!array.is_home().unwrap());
        bench.switches[0].set(true);
        assert!(!array.is_home().unwrap());
        bench.switches[1].set(true);
        assert!(array.is_home().unwrap());
    }
}
