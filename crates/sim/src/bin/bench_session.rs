//! Scripted full bench session against the simulated rig.
//!
//! Arms the ESC, calibrates the load cell, then replays an operator
//! script: let the welcome screen elapse, short-press to select the
//! algorithm test, hold to commit, and let the bidirectional sweep run
//! to its payload report.
//!
//! Run with: `cargo run -p thrust_stand_sim --bin bench_session`

use thrust_stand_core::esc::IDLE_PULSE_US;
use thrust_stand_core::esc::EscInterface;
use thrust_stand_core::rig::{RigIo, TestStateMachine};
use thrust_stand_core::traits::TimeSource;
use thrust_stand_sim::{
    calibrate, ConsoleStatus, MotorModel, ScriptedButton, ScriptedKnob, SimClock, SimEsc,
    SimLoadCell, TextDisplay,
};

/// Control-loop pacing, as on the hardware rig.
const TICK_MS: u64 = 10;

fn main() {
    println!("=== UAV Motor Thrust Stand (bench simulation) ===\n");

    // 1. Bench setup: virtual clock, ESC, load cell on the thrust cradle
    let clock = SimClock::new();
    let mut esc = SimEsc::new();
    let mut cell = SimLoadCell::new(esc.pulse_handle(), MotorModel::standard(1.1))
        .with_noise(42, 0.003);

    // 2. Arm the ESC at the rest pulse
    println!("Arming ESC at {IDLE_PULSE_US}us (stopped)...");
    esc.write_pulse_us(IDLE_PULSE_US);
    clock.delay_ms(2_000);
    println!("ESC armed!");

    // 3. Calibrate the load cell
    println!("Calibrating load cell...");
    let calibration = calibrate(&mut cell).expect("load cell calibration failed");
    println!("Load cell calibrated!\n");

    // 4. Operator script, in sim-ms from now: welcome elapses on its
    // own, a short press selects option 2, a long hold commits it.
    let t0 = clock.now_ms();
    let button = ScriptedButton::new(
        clock.clone(),
        vec![
            (t0 + 3_000, t0 + 3_150), // select "2) Algorithm test"
            (t0 + 4_000, t0 + 7_600), // hold to commit
        ],
    );
    let knob = ScriptedKnob::at_rest(clock.clone());

    // 5. Assemble the rig and run the session
    let io = RigIo {
        time: clock.clone(),
        button,
        knob,
        esc,
        scale: cell,
        display: TextDisplay::new(),
        status: ConsoleStatus,
    };
    let mut rig = TestStateMachine::new(io, calibration);
    rig.start();

    let deadline = clock.now_ms() + 120_000;
    while !rig.is_complete() && clock.now_ms() < deadline {
        rig.tick();
        clock.advance(TICK_MS);
    }

    println!("\n--- final display ---");
    println!("{}", rig.io.display.frame());
    println!("---------------------");

    match rig.report() {
        Some(report) => println!(
            "\nSweep finished after {} steps; peak thrust {:.3} kg, payload capacity {:.3} kg.",
            report.ramp.steps_completed,
            report.ramp.peak_thrust_kg,
            report.payload.payload_capacity_kg
        ),
        None => println!("\nSession ended without a completed sweep."),
    }
}
