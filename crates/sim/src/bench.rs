//! Simulated bench peripherals.
//!
//! The pieces of the physical rig, modeled just deeply enough to drive
//! the core end to end: the ESC output is captured into a shared cell,
//! the load cell derives its reading from the last commanded pulse
//! through a simple motor model, and the operator (button, knob) is
//! replayed from a timeline in simulated time.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use thrust_stand_core::button::ButtonInput;
use thrust_stand_core::display::{DisplaySink, StatusSink, DISPLAY_COLS, DISPLAY_ROWS};
use thrust_stand_core::esc::{EscInterface, PulseEnvelope, ThrottleInput, SWEEP_ENVELOPE};
use thrust_stand_core::scale::WeightSensor;

use crate::clock::SimClock;

// ============================================================================
// ESC and motor model
// ============================================================================

/// Simulated speed controller.
///
/// Records every commanded pulse for test verification and publishes the
/// latest one through a shared cell the load-cell model reads back.
#[derive(Debug)]
pub struct SimEsc {
    pulse_us: Rc<Cell<u16>>,
    history: Vec<u16>,
}

impl SimEsc {
    pub fn new() -> Self {
        Self {
            pulse_us: Rc::new(Cell::new(0)),
            history: Vec::new(),
        }
    }

    /// Handle to the latest commanded pulse, for coupling a motor model.
    pub fn pulse_handle(&self) -> Rc<Cell<u16>> {
        Rc::clone(&self.pulse_us)
    }

    /// Latest commanded pulse (0 before the first write).
    pub fn last_pulse_us(&self) -> u16 {
        self.pulse_us.get()
    }

    /// Every pulse commanded so far, in order.
    pub fn history(&self) -> &[u16] {
        &self.history
    }
}

impl Default for SimEsc {
    fn default() -> Self {
        Self::new()
    }
}

impl EscInterface for SimEsc {
    fn write_pulse_us(&mut self, pulse_us: u16) {
        self.pulse_us.set(pulse_us);
        self.history.push(pulse_us);
    }
}

/// First-order motor/propeller model.
///
/// Thrust rises quadratically with throttle fraction, which under the
/// rig's inverted convention means it peaks at the envelope's `min_us`
/// and vanishes at `max_us` and anywhere slower (the idle pulse).
#[derive(Debug, Clone, Copy)]
pub struct MotorModel {
    /// Pulse range over which the motor produces thrust
    pub envelope: PulseEnvelope,
    /// Thrust at full throttle (kg)
    pub peak_thrust_kg: f32,
}

impl MotorModel {
    /// Model for the standard sweep envelope.
    pub fn standard(peak_thrust_kg: f32) -> Self {
        Self {
            envelope: SWEEP_ENVELOPE,
            peak_thrust_kg,
        }
    }

    /// Thrust produced at the given commanded pulse (kg).
    pub fn thrust_kg(&self, pulse_us: u16) -> f32 {
        if pulse_us == 0 || pulse_us >= self.envelope.max_us {
            return 0.0;
        }
        let clamped = self.envelope.clamp(pulse_us);
        let fraction =
            f32::from(self.envelope.max_us - clamped) / f32::from(self.envelope.span_us());
        self.peak_thrust_kg * fraction * fraction
    }
}

// ============================================================================
// Load cell
// ============================================================================

/// Raw counts the simulated amplifier produces per kilogram on the cradle.
const SENSOR_GAIN_UNITS_PER_KG: f32 = 21_500.0;

/// Simulated load cell behind an HX711-style amplifier.
///
/// Raw counts come from whatever sits on the cradle: a calibration
/// reference weight and/or the thrust of the running motor. Tare and
/// scale are applied exactly as the hardware driver would
/// (`units = (raw - offset) / scale`), so the startup calibration
/// routine runs against this model unchanged.
pub struct SimLoadCell {
    pulse_us: Rc<Cell<u16>>,
    model: MotorModel,
    offset_units: f32,
    scale_units_per_kg: f32,
    reference_kg: f32,
    noise_kg: f32,
    rng: SmallRng,
    /// Every Nth readiness poll reports not-ready; 0 disables
    not_ready_every: u32,
    polls: u32,
}

impl SimLoadCell {
    /// Creates a noise-free, always-ready load cell coupled to the
    /// given ESC pulse handle.
    pub fn new(pulse_us: Rc<Cell<u16>>, model: MotorModel) -> Self {
        Self {
            pulse_us,
            model,
            offset_units: 0.0,
            scale_units_per_kg: 1.0,
            reference_kg: 0.0,
            noise_kg: 0.0,
            rng: SmallRng::seed_from_u64(0),
            not_ready_every: 0,
            polls: 0,
        }
    }

    /// Adds seeded gaussian-ish measurement noise (uniform ±`noise_kg`).
    pub fn with_noise(mut self, seed: u64, noise_kg: f32) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self.noise_kg = noise_kg;
        self
    }

    /// Makes every `n`th readiness poll report not-ready.
    pub fn with_not_ready_every(mut self, n: u32) -> Self {
        self.not_ready_every = n;
        self
    }

    /// Changes the not-ready duty on a live cell (`0` disables).
    pub fn set_not_ready_every(&mut self, n: u32) {
        self.not_ready_every = n;
    }

    /// Places a reference weight on the cradle (calibration only).
    pub fn place_reference(&mut self, kg: f32) {
        self.reference_kg = kg;
    }

    /// Removes the reference weight.
    pub fn remove_reference(&mut self) {
        self.reference_kg = 0.0;
    }

    /// Zeroes the baseline at the current load.
    pub fn tare(&mut self) {
        self.offset_units = self.raw_units();
    }

    /// Sets the units-per-kilogram scale divisor.
    pub fn set_scale(&mut self, units_per_kg: f32) {
        self.scale_units_per_kg = units_per_kg;
    }

    /// Blocking averaged raw read, tare subtracted (calibration only).
    pub fn read_average_raw(&mut self, samples: u32) -> f32 {
        let mut sum = 0.0;
        for _ in 0..samples {
            sum += self.raw_units() - self.offset_units;
        }
        sum / samples as f32
    }

    fn raw_units(&mut self) -> f32 {
        let load_kg = self.reference_kg + self.model.thrust_kg(self.pulse_us.get());
        let noise = if self.noise_kg > 0.0 {
            self.rng.gen_range(-self.noise_kg..=self.noise_kg)
        } else {
            0.0
        };
        (load_kg + noise) * SENSOR_GAIN_UNITS_PER_KG
    }
}

impl WeightSensor for SimLoadCell {
    fn is_ready(&mut self) -> bool {
        self.polls += 1;
        if self.not_ready_every == 0 {
            return true;
        }
        self.polls % self.not_ready_every != 0
    }

    fn read_units(&mut self) -> f32 {
        (self.raw_units() - self.offset_units) / self.scale_units_per_kg
    }
}

// ============================================================================
// Operator input
// ============================================================================

/// Push-button replayed from press windows in simulated time.
///
/// Pressed while `now` lies in any `[from, to)` window.
#[derive(Debug, Clone)]
pub struct ScriptedButton {
    clock: SimClock,
    windows: Vec<(u64, u64)>,
}

impl ScriptedButton {
    pub fn new(clock: SimClock, windows: Vec<(u64, u64)>) -> Self {
        Self { clock, windows }
    }

    /// A button that is never pressed.
    pub fn released(clock: SimClock) -> Self {
        Self::new(clock, Vec::new())
    }
}

impl ButtonInput for ScriptedButton {
    fn is_pressed(&self) -> bool {
        use thrust_stand_core::traits::TimeSource;
        let now = self.clock.now_ms();
        self.windows.iter().any(|&(from, to)| now >= from && now < to)
    }
}

/// Throttle knob replayed from a position timeline.
///
/// Reads the value of the latest `(at_ms, raw)` entry at or before the
/// current simulated time; 0 before the first entry.
#[derive(Debug, Clone)]
pub struct ScriptedKnob {
    clock: SimClock,
    timeline: Vec<(u64, u16)>,
}

impl ScriptedKnob {
    pub fn new(clock: SimClock, timeline: Vec<(u64, u16)>) -> Self {
        Self { clock, timeline }
    }

    /// A knob resting at zero.
    pub fn at_rest(clock: SimClock) -> Self {
        Self::new(clock, Vec::new())
    }
}

impl ThrottleInput for ScriptedKnob {
    fn read_raw(&mut self) -> u16 {
        use thrust_stand_core::traits::TimeSource;
        let now = self.clock.now_ms();
        self.timeline
            .iter()
            .rev()
            .find(|&&(at_ms, _)| at_ms <= now)
            .map(|&(_, raw)| raw)
            .unwrap_or(0)
    }
}

// ============================================================================
// Display and status sinks
// ============================================================================

/// In-memory 20x4 character display.
#[derive(Debug, Clone)]
pub struct TextDisplay {
    rows: [[char; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
}

impl TextDisplay {
    pub fn new() -> Self {
        Self {
            rows: [[' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
        }
    }

    /// One row as text, trailing blanks trimmed.
    pub fn row_text(&self, row: u8) -> String {
        let row: String = self.rows[row as usize].iter().collect();
        row.trim_end().to_string()
    }

    /// The whole frame as four newline-joined rows.
    pub fn frame(&self) -> String {
        (0..DISPLAY_ROWS)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TextDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for TextDisplay {
    fn clear(&mut self) {
        self.rows = [[' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize];
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        if row >= DISPLAY_ROWS {
            return;
        }
        let mut col = usize::from(col);
        for ch in text.chars() {
            if col >= usize::from(DISPLAY_COLS) {
                break;
            }
            self.rows[usize::from(row)][col] = ch;
            col += 1;
        }
    }
}

/// Status sink printing straight to stdout (session driver).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn status_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Status sink capturing lines for assertion (tests).
#[derive(Debug, Clone, Default)]
pub struct CapturedStatus {
    pub lines: Vec<String>,
}

impl CapturedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl StatusSink for CapturedStatus {
    fn status_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
