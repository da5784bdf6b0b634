//! Top-level test state machine
//!
//! Owns the rig context (every platform seam plus the calibration) and
//! drives the whole bench session tick by tick: welcome splash, menu
//! selection, the knob-driven manual test, and the automated ramp test
//! with its payload report.
//!
//! One tick = one classifier poll plus one dispatch on the current
//! state. The automated sweep is the exception: committing it runs the
//! sequencer synchronously to completion or abort inside that tick.

use core::fmt::Write as _;

use heapless::String;

use crate::button::{ButtonClassifier, ButtonEvent, ButtonInput};
use crate::display::{DisplaySink, StatusSink};
use crate::esc::{
    command_to_pulse, pulse_to_percent, EscInterface, ThrottleInput, IDLE_PULSE_US, KNOB_RAW_MAX,
    MANUAL_ENVELOPE,
};
use crate::payload::{self, PayloadResult, FRAME_WEIGHT_KG, ROTOR_COUNT, THRUST_TO_WEIGHT_RATIO};
use crate::ramp::{RampConfig, RampResult, RampSequencer, SweepObserver, SweepReading};
use crate::scale::{sample_kg, Calibration, WeightSensor};
use crate::traits::TimeSource;

use super::screens;
use super::state::{transition, MenuSelection, RigAction, RigEvent, RigState};

/// How long the welcome splash stays up before the menu appears (ms).
pub const WELCOME_HOLD_MS: u64 = 2000;

/// Pause after each manual-test reading (ms).
pub const MANUAL_SAMPLE_MS: u32 = 100;

/// How long the abort notice stays on screen when leaving a test (ms).
pub const ABORT_NOTICE_MS: u32 = 1000;

/// Settle time at the idle pulse before re-entering the menu (ms).
pub const EXIT_SETTLE_MS: u32 = 500;

/// How long the sweep's "Starting..." banner stays up (ms).
pub const SWEEP_BANNER_MS: u32 = 1000;

type StatusLine = String<64>;

/// The rig context: every platform seam the state machine drives.
pub struct RigIo<T, B, K, E, S, D, L>
where
    T: TimeSource,
    B: ButtonInput,
    K: ThrottleInput,
    E: EscInterface,
    S: WeightSensor,
    D: DisplaySink,
    L: StatusSink,
{
    pub time: T,
    pub button: B,
    pub knob: K,
    pub esc: E,
    pub scale: S,
    pub display: D,
    pub status: L,
}

/// Result of one completed (non-aborted) automated test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepReport {
    pub ramp: RampResult,
    pub payload: PayloadResult,
}

/// Top-level controller for the bench rig.
pub struct TestStateMachine<T, B, K, E, S, D, L>
where
    T: TimeSource,
    B: ButtonInput,
    K: ThrottleInput,
    E: EscInterface,
    S: WeightSensor,
    D: DisplaySink,
    L: StatusSink,
{
    /// Platform seams, public so drivers and tests can reach them
    pub io: RigIo<T, B, K, E, S, D, L>,
    classifier: ButtonClassifier,
    sequencer: RampSequencer,
    calibration: Calibration,
    state: RigState,
    selection: MenuSelection,
    state_entered_ms: u64,
    report: Option<SweepReport>,
}

impl<T, B, K, E, S, D, L> TestStateMachine<T, B, K, E, S, D, L>
where
    T: TimeSource,
    B: ButtonInput,
    K: ThrottleInput,
    E: EscInterface,
    S: WeightSensor,
    D: DisplaySink,
    L: StatusSink,
{
    /// Creates the machine in the Welcome state with the standard sweep
    /// configuration.
    pub fn new(io: RigIo<T, B, K, E, S, D, L>, calibration: Calibration) -> Self {
        Self::with_sweep_config(io, calibration, RampConfig::sweep_default())
    }

    /// Creates the machine with a custom sweep configuration.
    pub fn with_sweep_config(
        io: RigIo<T, B, K, E, S, D, L>,
        calibration: Calibration,
        sweep: RampConfig,
    ) -> Self {
        Self {
            io,
            classifier: ButtonClassifier::new(),
            sequencer: RampSequencer::new(sweep),
            calibration,
            state: RigState::Welcome,
            selection: MenuSelection::default(),
            state_entered_ms: 0,
            report: None,
        }
    }

    pub fn state(&self) -> RigState {
        self.state
    }

    pub fn selection(&self) -> MenuSelection {
        self.selection
    }

    /// The latched result of a completed automated test, if any.
    pub fn report(&self) -> Option<&SweepReport> {
        self.report.as_ref()
    }

    /// `true` once an automated test has completed; the rig is terminal
    /// and only a reset starts a new session.
    pub fn is_complete(&self) -> bool {
        self.report.is_some()
    }

    /// Shows the welcome splash and records its display time.
    ///
    /// Call once after bring-up (ESC armed, scale calibrated), before
    /// the first tick.
    pub fn start(&mut self) {
        screens::welcome(&mut self.io.display);
        self.io.status.status_line("Welcome screen displayed");
        self.state = RigState::Welcome;
        self.state_entered_ms = self.io.time.now_ms();
    }

    /// Runs one control-loop iteration.
    pub fn tick(&mut self) {
        let level = self.io.button.is_pressed();
        let event = self.classifier.poll(level, self.io.time.now_ms());

        match self.state {
            RigState::Welcome => {
                if self.io.time.elapsed_since_ms(self.state_entered_ms) >= WELCOME_HOLD_MS {
                    self.apply(RigEvent::WelcomeElapsed);
                }
            }
            RigState::Menu => self.apply(RigEvent::Button(event)),
            RigState::ManualTest => {
                if event == ButtonEvent::LongPress {
                    self.apply(RigEvent::Button(event));
                } else {
                    self.manual_reading();
                }
            }
            // Terminal once completed; an abort already returned to Menu
            // inside the committing tick.
            RigState::AlgorithmTest => {}
        }
    }

    /// Applies one transition-table row and performs its side effect.
    fn apply(&mut self, event: RigEvent) {
        let row = transition(self.state, self.selection, event);
        if row.next != self.state {
            self.state_entered_ms = self.io.time.now_ms();
        }
        self.state = row.next;

        match row.action {
            RigAction::None => {}
            RigAction::ShowMenu => {
                screens::menu(&mut self.io.display, self.selection);
                self.io.status.status_line("Menu displayed");
            }
            RigAction::ToggleSelection => {
                self.selection = self.selection.toggled();
                screens::menu(&mut self.io.display, self.selection);

                let mut line = StatusLine::new();
                let _ = write!(line, "Option selected: {}", self.selection.option_number());
                self.io.status.status_line(&line);
            }
            RigAction::EnterManualTest => self.enter_manual(),
            RigAction::EnterAlgorithmTest => self.enter_algorithm(),
            RigAction::ExitManualTest => self.exit_manual(),
            RigAction::ExitAbortedSweep => {
                self.io.status.status_line("Exiting algorithm test...");
                self.io.time.delay_ms(EXIT_SETTLE_MS);
                screens::menu(&mut self.io.display, self.selection);
                self.io.status.status_line("Returned to menu");
            }
            // Report rendering happens in enter_algorithm, where the
            // sweep result is still at hand.
            RigAction::ShowReport => {}
        }
    }

    fn enter_manual(&mut self) {
        self.io.status.status_line("=== Manual Test Mode ===");
        screens::manual_labels(&mut self.io.display);
        self.io
            .status
            .status_line("Throttle % | PWM (us) | Thrust (kg)");
        self.io
            .status
            .status_line("========================================");
    }

    /// One manual-test iteration: knob, pulse, sample, report.
    fn manual_reading(&mut self) {
        let raw = self.io.knob.read_raw();
        let pulse_us = command_to_pulse(
            f32::from(raw),
            0.0,
            f32::from(KNOB_RAW_MAX),
            MANUAL_ENVELOPE,
        );
        self.io.esc.write_pulse_us(pulse_us);

        let throttle_percent = pulse_to_percent(pulse_us, MANUAL_ENVELOPE);
        let thrust_kg = sample_kg(&mut self.io.scale, &self.calibration);

        screens::manual_reading(&mut self.io.display, throttle_percent, thrust_kg);

        let mut line = StatusLine::new();
        let _ = write!(
            line,
            "{}%\t| {}us\t| {:.3} kg",
            throttle_percent, pulse_us, thrust_kg
        );
        self.io.status.status_line(&line);

        self.io.time.delay_ms(MANUAL_SAMPLE_MS);
    }

    fn exit_manual(&mut self) {
        self.io.status.status_line("Exiting manual test...");
        screens::aborting(&mut self.io.display);
        self.io.time.delay_ms(ABORT_NOTICE_MS);

        self.io.esc.write_pulse_us(IDLE_PULSE_US);
        self.io.time.delay_ms(EXIT_SETTLE_MS);

        screens::menu(&mut self.io.display, self.selection);
        self.io.status.status_line("Returned to menu");
    }

    /// Runs the automated test synchronously: sweep, then either the
    /// payload report (terminal) or the return to the menu on abort.
    fn enter_algorithm(&mut self) {
        self.io.status.status_line("=== Algorithm Test Mode ===");
        screens::sweep_starting(&mut self.io.display);
        self.io.time.delay_ms(SWEEP_BANNER_MS);
        screens::sweep_running(&mut self.io.display);
        self.io
            .status
            .status_line("PWM (us) | Throttle % | Thrust (kg) | Progress");
        self.io
            .status
            .status_line("=============================================");

        let result = {
            let mut reporter = SweepReporter {
                display: &mut self.io.display,
                status: &mut self.io.status,
            };
            self.sequencer.run(
                &self.io.time,
                &mut self.classifier,
                &self.io.button,
                &mut self.io.esc,
                &mut self.io.scale,
                &self.calibration,
                &mut reporter,
            )
        };

        if result.aborted {
            self.apply(RigEvent::SweepAborted);
            return;
        }

        let estimate = payload::estimate(
            result.peak_thrust_kg,
            ROTOR_COUNT,
            FRAME_WEIGHT_KG,
            THRUST_TO_WEIGHT_RATIO,
        );
        self.report_payload(result.peak_thrust_kg, &estimate);
        screens::report(&mut self.io.display, result.peak_thrust_kg, &estimate);
        self.report = Some(SweepReport {
            ramp: result,
            payload: estimate,
        });
        self.apply(RigEvent::SweepCompleted);
    }

    fn report_payload(&mut self, peak_thrust_kg: f32, estimate: &PayloadResult) {
        let status = &mut self.io.status;
        status.status_line("========== PAYLOAD CALCULATION ==========");

        let mut line = StatusLine::new();
        let _ = write!(line, "Max single motor thrust: {:.3} kg", peak_thrust_kg);
        status.status_line(&line);

        line.clear();
        let _ = write!(
            line,
            "Total thrust ({} motors): {:.3} kg",
            ROTOR_COUNT, estimate.total_thrust_kg
        );
        status.status_line(&line);

        line.clear();
        let _ = write!(line, "Drone weight: {:.3} kg", FRAME_WEIGHT_KG);
        status.status_line(&line);

        line.clear();
        let _ = write!(line, "Thrust-to-weight ratio: {:.1}:1", THRUST_TO_WEIGHT_RATIO);
        status.status_line(&line);

        line.clear();
        let _ = write!(
            line,
            ">>> PAYLOAD CAPACITY: {:.3} kg <<<",
            estimate.payload_capacity_kg
        );
        status.status_line(&line);

        status.status_line("=========================================");
    }
}

/// Bridges sweep progress to the operator display and the status log.
struct SweepReporter<'a, D: DisplaySink, L: StatusSink> {
    display: &'a mut D,
    status: &'a mut L,
}

impl<D: DisplaySink, L: StatusSink> SweepObserver for SweepReporter<'_, D, L> {
    fn on_step(&mut self, reading: &SweepReading) {
        if reading.step == 1 {
            self.status.status_line("=== Speeding up ===");
        }
        if reading.step == reading.total_steps / 2 + 1 {
            self.status.status_line("=== Slowing down ===");
        }

        screens::sweep_progress(self.display, reading.progress_percent, reading.thrust_kg);

        let mut line = StatusLine::new();
        let _ = write!(
            line,
            "{}us\t| {}%\t| {:.3} kg\t| {}%",
            reading.pulse_us, reading.throttle_percent, reading.thrust_kg, reading.progress_percent
        );
        self.status.status_line(&line);
    }

    fn on_settle_hold(&mut self) {
        self.status
            .status_line("[HOLD] At maximum speed for 2 seconds");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockTime;
    use heapless::Vec;

    struct ScriptButton<'a> {
        time: &'a MockTime,
        windows: Vec<(u64, u64), 8>,
    }

    impl ButtonInput for ScriptButton<'_> {
        fn is_pressed(&self) -> bool {
            let now = self.time.now_ms();
            self.windows
                .iter()
                .any(|&(from, to)| now >= from && now < to)
        }
    }

    struct FixedKnob(u16);

    impl ThrottleInput for FixedKnob {
        fn read_raw(&mut self) -> u16 {
            self.0
        }
    }

    struct RecordingEsc {
        last: u16,
        writes: u32,
    }

    impl EscInterface for RecordingEsc {
        fn write_pulse_us(&mut self, pulse_us: u16) {
            self.last = pulse_us;
            self.writes += 1;
        }
    }

    struct ConstantSensor {
        units: f32,
        ready: bool,
    }

    impl WeightSensor for ConstantSensor {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn read_units(&mut self) -> f32 {
            self.units
        }
    }

    struct NullDisplay;

    impl DisplaySink for NullDisplay {
        fn clear(&mut self) {}
        fn write_at(&mut self, _col: u8, _row: u8, _text: &str) {}
    }

    struct CountingStatus {
        lines: u32,
    }

    impl StatusSink for CountingStatus {
        fn status_line(&mut self, _line: &str) {
            self.lines += 1;
        }
    }

    type TestMachine<'a> = TestStateMachine<
        &'a MockTime,
        ScriptButton<'a>,
        FixedKnob,
        RecordingEsc,
        ConstantSensor,
        NullDisplay,
        CountingStatus,
    >;

    fn machine_with<'a>(
        time: &'a MockTime,
        windows: &[(u64, u64)],
        units: f32,
        ready: bool,
    ) -> TestMachine<'a> {
        let mut script = Vec::new();
        for &w in windows {
            script.push(w).unwrap();
        }
        let io = RigIo {
            time,
            button: ScriptButton {
                time,
                windows: script,
            },
            knob: FixedKnob(0),
            esc: RecordingEsc { last: 0, writes: 0 },
            scale: ConstantSensor { units, ready },
            display: NullDisplay,
            status: CountingStatus { lines: 0 },
        };
        TestStateMachine::new(io, Calibration::new(1.0))
    }

    /// Ticks the machine `count` times, advancing the clock `step_ms`
    /// between ticks.
    fn run_ticks(machine: &mut TestMachine<'_>, count: u32, step_ms: u64) {
        for _ in 0..count {
            machine.tick();
            machine.io.time.advance(step_ms);
        }
    }

    #[test]
    fn test_welcome_holds_then_shows_menu() {
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[], 0.0, true);
        machine.start();

        run_ticks(&mut machine, 10, 10);
        assert_eq!(machine.state(), RigState::Welcome);

        time.set(2_000);
        machine.tick();
        assert_eq!(machine.state(), RigState::Menu);
    }

    #[test]
    fn test_menu_toggle_round_trip() {
        // Two clean short presses once the menu is up.
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[(3_000, 3_100), (4_000, 4_100)], 0.0, true);
        machine.start();

        time.set(2_000);
        machine.tick();
        assert_eq!(machine.selection(), MenuSelection::ManualTest);

        run_ticks(&mut machine, 300, 10);
        assert_eq!(machine.state(), RigState::Menu);
        assert_eq!(machine.selection(), MenuSelection::ManualTest);

        // First press toggled to 2, second back to 1: verify via a
        // single-press script.
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[(3_000, 3_100)], 0.0, true);
        machine.start();
        time.set(2_000);
        machine.tick();
        run_ticks(&mut machine, 200, 10);
        assert_eq!(machine.selection(), MenuSelection::AlgorithmTest);
    }

    #[test]
    fn test_manual_test_commands_envelope_pulse_and_exits_to_idle() {
        // Long press at 2.1 s commits manual mode; a second long press
        // starting at 10 s exits it.
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[(2_100, 5_200), (10_000, 13_500)], 0.0, true);
        machine.start();
        machine.io.knob.0 = KNOB_RAW_MAX;

        time.set(2_000);
        machine.tick();
        assert_eq!(machine.state(), RigState::Menu);

        // Commit fires once the hold passes 3000 ms.
        run_ticks(&mut machine, 350, 10);
        assert_eq!(machine.state(), RigState::ManualTest);
        // Knob at full scale commands the fastest manual pulse.
        assert_eq!(machine.io.esc.last, MANUAL_ENVELOPE.min_us);

        // Second hold exits back to the menu with the motor parked.
        run_ticks(&mut machine, 900, 10);
        assert_eq!(machine.state(), RigState::Menu);
        assert_eq!(machine.io.esc.last, IDLE_PULSE_US);
    }

    #[test]
    fn test_algorithm_test_completes_and_latches_report() {
        // Select option 2 with a short press, then commit with a hold.
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[(2_100, 2_200), (2_500, 5_600)], 0.25, true);
        machine.start();

        time.set(2_000);
        machine.tick();
        run_ticks(&mut machine, 400, 10);

        assert_eq!(machine.state(), RigState::AlgorithmTest);
        assert!(machine.is_complete());

        let report = *machine.report().unwrap();
        assert!(!report.ramp.aborted);
        assert_eq!(report.ramp.steps_completed, 26);
        // 0.25 units at unit correction: peak 0.25 kg across 4 rotors
        // at ratio 2 over a 0.5 kg frame.
        assert!((report.payload.total_thrust_kg - 1.0).abs() < 1e-6);
        assert!((report.payload.payload_capacity_kg - 0.0).abs() < 1e-6);
        assert_eq!(machine.io.esc.last, IDLE_PULSE_US);

        // Terminal: further input changes nothing.
        run_ticks(&mut machine, 100, 10);
        assert_eq!(machine.state(), RigState::AlgorithmTest);
    }

    #[test]
    fn test_never_ready_sensor_reports_negative_payload() {
        let time = MockTime::new();
        let mut machine = machine_with(&time, &[(2_100, 2_200), (2_500, 5_600)], 9.9, false);
        machine.start();

        time.set(2_000);
        machine.tick();
        run_ticks(&mut machine, 400, 10);

        let report = machine.report().unwrap();
        assert_eq!(report.ramp.peak_thrust_kg, 0.0);
        assert!(report.payload.payload_capacity_kg < 0.0);
    }
}
