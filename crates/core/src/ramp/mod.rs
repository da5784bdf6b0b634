//! Bidirectional throttle ramp sweep
//!
//! Platform-agnostic sequencer for the automated thrust test: two
//! symmetric phases over the sweep envelope, first stepping the pulse
//! down from `max_us` to `min_us` (speeding up under the inverted
//! convention), then after a settle hold at full speed stepping back up
//! (slowing down). Each step samples thrust and folds it into a running
//! peak.
//!
//! The sequencer does not know about LCDs, serial ports, or any platform
//! service. It commands hardware through the [`EscInterface`] and
//! [`WeightSensor`] seams and reports per-step progress through the
//! [`SweepObserver`] trait.
//!
//! # Abort semantics
//!
//! The abort signal (a long press) is checked exactly once per step, at
//! the top of the step before the actuator is commanded. A long press
//! asserted mid-dwell is observed at the next step boundary, bounding
//! worst-case abort latency to one dwell interval. On abort the ESC is
//! parked at the idle pulse and the partial result is returned.

use crate::button::{ButtonClassifier, ButtonEvent, ButtonInput};
use crate::esc::{pulse_to_percent, EscInterface, PulseEnvelope, IDLE_PULSE_US, SWEEP_ENVELOPE};
use crate::scale::{sample_kg, Calibration, WeightSensor};
use crate::traits::TimeSource;

/// Pulse increment between sweep steps (µs).
pub const SWEEP_STEP_US: u16 = 10;

/// Dwell after each commanded step before the next (ms).
pub const STEP_DWELL_MS: u32 = 2000;

/// Hold at full speed between the two phases, with no sampling (ms).
pub const SETTLE_HOLD_MS: u32 = 2000;

/// Sweep configuration.
///
/// `step_us` must be positive. It does not have to divide the envelope
/// span evenly: the final step of a phase uses a shortened increment so
/// the phase boundary is visited exactly once.
#[derive(Debug, Clone, Copy)]
pub struct RampConfig {
    /// Pulse range the sweep traverses
    pub envelope: PulseEnvelope,
    /// Pulse increment per step (µs)
    pub step_us: u16,
    /// Wait after each step (ms)
    pub dwell_ms: u32,
}

impl RampConfig {
    pub const fn new(envelope: PulseEnvelope, step_us: u16, dwell_ms: u32) -> Self {
        Self {
            envelope,
            step_us,
            dwell_ms,
        }
    }

    /// The rig's standard automated test configuration.
    pub const fn sweep_default() -> Self {
        Self::new(SWEEP_ENVELOPE, SWEEP_STEP_US, STEP_DWELL_MS)
    }

    /// Steps per phase, rounding the last partial increment up.
    pub const fn steps_per_phase(&self) -> u32 {
        let span = self.envelope.span_us() as u32;
        let step = self.step_us as u32;
        (span + step - 1) / step
    }

    /// Steps across both phases.
    pub const fn total_steps(&self) -> u32 {
        2 * self.steps_per_phase()
    }
}

/// Outcome of one sweep.
///
/// Created fresh at the start of each run; `peak_thrust_kg` is
/// monotonically non-decreasing across the sweep's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampResult {
    /// Highest single sample observed before completion or abort (kg)
    pub peak_thrust_kg: f32,
    /// Steps fully executed (commanded and sampled)
    pub steps_completed: u32,
    /// `true` when the sweep stopped on a long press
    pub aborted: bool,
}

/// One executed sweep step, as reported to the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepReading {
    /// 1-based step number
    pub step: u32,
    /// Steps across both phases
    pub total_steps: u32,
    /// Pulse commanded for this step (µs)
    pub pulse_us: u16,
    /// Throttle percentage corresponding to the pulse
    pub throttle_percent: u8,
    /// Corrected thrust sample for this step (kg)
    pub thrust_kg: f32,
    /// Whole-sweep progress at the start of this step (0-99 %)
    pub progress_percent: u8,
}

/// Progress contract between the sequencer and the rig's reporting layer.
///
/// The rig renders these to the operator display and the status log; test
/// doubles record them for assertion.
pub trait SweepObserver {
    /// Called after each executed step.
    fn on_step(&mut self, reading: &SweepReading);

    /// Called once between the two phases, before the settle hold.
    fn on_settle_hold(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepPhase {
    /// Descending pulse, rising speed
    SpeedUp,
    /// Ascending pulse, falling speed
    SlowDown,
}

/// Bidirectional sweep sequencer.
pub struct RampSequencer {
    config: RampConfig,
}

impl RampSequencer {
    pub const fn new(config: RampConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RampConfig {
        &self.config
    }

    /// Runs the sweep to completion or abort.
    ///
    /// Blocking: dwell and settle waits go through `time`, so the call
    /// monopolizes the control loop for the sweep's duration. Mock time
    /// sources make it instantaneous on host.
    pub fn run<T, B, E, S>(
        &self,
        time: &T,
        classifier: &mut ButtonClassifier,
        button: &B,
        esc: &mut E,
        sensor: &mut S,
        calibration: &Calibration,
        observer: &mut dyn SweepObserver,
    ) -> RampResult
    where
        T: TimeSource,
        B: ButtonInput,
        E: EscInterface,
        S: WeightSensor,
    {
        let steps_per_phase = self.config.steps_per_phase();
        let total_steps = self.config.total_steps();
        let mut peak_thrust_kg = 0.0_f32;
        let mut steps_completed = 0_u32;

        for phase in [SweepPhase::SpeedUp, SweepPhase::SlowDown] {
            for step_index in 1..=steps_per_phase {
                // Abort checkpoint: before commanding this step.
                let event = classifier.poll(button.is_pressed(), time.now_ms());
                if event == ButtonEvent::LongPress {
                    esc.write_pulse_us(IDLE_PULSE_US);
                    return RampResult {
                        peak_thrust_kg,
                        steps_completed,
                        aborted: true,
                    };
                }

                let pulse_us = self.step_pulse(phase, step_index);
                esc.write_pulse_us(pulse_us);

                let thrust_kg = sample_kg(sensor, calibration);
                if thrust_kg > peak_thrust_kg {
                    peak_thrust_kg = thrust_kg;
                }

                let reading = SweepReading {
                    step: steps_completed + 1,
                    total_steps,
                    pulse_us,
                    throttle_percent: pulse_to_percent(pulse_us, self.config.envelope),
                    thrust_kg,
                    progress_percent: (steps_completed * 100 / total_steps) as u8,
                };
                steps_completed += 1;
                observer.on_step(&reading);

                time.delay_ms(self.config.dwell_ms);
            }

            if phase == SweepPhase::SpeedUp {
                observer.on_settle_hold();
                time.delay_ms(SETTLE_HOLD_MS);
            }
        }

        esc.write_pulse_us(IDLE_PULSE_US);
        RampResult {
            peak_thrust_kg,
            steps_completed,
            aborted: false,
        }
    }

    /// Pulse for the given 1-based step of a phase.
    ///
    /// The last step clamps to the phase boundary, shortening its
    /// increment when the step size does not divide the span evenly.
    fn step_pulse(&self, phase: SweepPhase, step_index: u32) -> u16 {
        let envelope = self.config.envelope;
        let delta = step_index * u32::from(self.config.step_us);
        match phase {
            SweepPhase::SpeedUp => {
                let pulse = i64::from(envelope.max_us) - i64::from(delta);
                if pulse <= i64::from(envelope.min_us) {
                    envelope.min_us
                } else {
                    pulse as u16
                }
            }
            SweepPhase::SlowDown => {
                let pulse = u32::from(envelope.min_us) + delta;
                if pulse >= u32::from(envelope.max_us) {
                    envelope.max_us
                } else {
                    pulse as u16
                }
            }
        }
    }
}
