//! Example: a three-axis safety array on simulated hardware.
//!
//! This example demonstrates how to:
//! - Build an array from a TOML configuration
//! - Home every axis against its limit switch
//! - Follow operator targets, then retract when they go stale
//! - Watch the drivers power down once everything holds still
//!
//! Run with: `cargo run --example safety_array --features std`

use std::cell::Cell;

use safety_stepper_array::{
    error::Result,
    parse_config,
    sim::{SimPin, SimStepper, SimSwitch},
    HomingStatus, SimClock, StepperArray, Steps,
};

const CONFIG: &str = r#"
max_speed_steps_per_sec = 1000.0
max_acceleration_steps_per_sec2 = 2000.0
home_speed_steps_per_sec = 400.0

[timing]
timeout_ms = 1500
motion_hold_ms = 500

[[axes]]
name = "shutter"
safe_position = 0

[[axes]]
name = "arm"
safe_position = 25

[[axes]]
name = "clamp"
safe_position = 5
"#;

type DemoArray<'a> =
    StepperArray<SimStepper, SimSwitch<'a>, SimPin<'a>, SimPin<'a>, &'a SimClock, 3>;

fn print_status(array: &DemoArray<'_>, clock: &SimClock) -> Result<()> {
    print!(
        "  t={:>5} ms  {:?}  power={:<5}",
        clock.peek_micros() / 1_000,
        array.mode(),
        array.is_enabled()
    );
    for axis in 1..=array.axis_count() {
        print!("  #{}={:>4}", axis, array.current_position(axis)?.value());
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    println!("=== Safety Stepper Array Example ===\n");

    let config = parse_config(CONFIG)?;
    let names: Vec<&str> = config.axis_names().collect();
    println!("Axes: {:?}", names);
    println!(
        "Timeout: {} ms, motion hold: {} ms\n",
        config.timing.timeout_ms, config.timing.motion_hold_ms
    );

    // Simulated hardware
    let clock = SimClock::new();
    let (wake, enable) = (Cell::new(false), Cell::new(true));
    let switches = [Cell::new(false), Cell::new(false), Cell::new(false)];
    let start = [Steps(12), Steps(30), Steps(7)];

    let mut array: DemoArray<'_> = StepperArray::new(
        SimPin::new(&wake),
        SimPin::new(&enable),
        &clock,
        config,
    )?;
    for (switch, position) in switches.iter().zip(start) {
        array.register(SimStepper::at(position), SimSwitch::new(switch))?;
    }
    array.initialize()?;

    // Homing: each axis presses its switch once it has travelled back to 0.
    println!("Homing...");
    array.begin_homing(1, 3, 5_000)?;
    loop {
        clock.advance_ms(1);
        for (axis, switch) in switches.iter().enumerate() {
            if array.current_position(axis + 1)? <= Steps::ZERO {
                switch.set(true);
            }
        }
        match array.poll_homing()? {
            HomingStatus::InProgress => continue,
            status => {
                println!("  {:?}", status);
                break;
            }
        }
    }
    for switch in &switches {
        switch.set(false);
    }
    print_status(&array, &clock)?;

    // Operator targets
    println!("\nFollowing operator targets...");
    array.set_target_position(1, Steps(40))?;
    array.set_target_position(2, Steps(60))?;
    array.set_target_position(3, Steps(15))?;
    for _ in 0..4 {
        for _ in 0..250 {
            clock.advance_ms(1);
            array.poll()?;
        }
        print_status(&array, &clock)?;
    }

    // No new targets: retract, hold, power down
    println!("\nWaiting for instructions to go stale...");
    for _ in 0..8 {
        for _ in 0..250 {
            clock.advance_ms(1);
            array.poll()?;
        }
        print_status(&array, &clock)?;
    }

    // A fresh target wakes everything up again
    println!("\nNew target for the arm...");
    array.set_target_position(2, Steps(10))?;
    for _ in 0..2 {
        for _ in 0..100 {
            clock.advance_ms(1);
            array.poll()?;
        }
        print_status(&array, &clock)?;
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
