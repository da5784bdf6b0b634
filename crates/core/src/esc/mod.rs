//! ESC pulse envelopes and throttle mapping
//!
//! The speed controller on this rig runs an *inverted* command range: a
//! shorter pulse commands a higher motor speed. This module provides:
//! - Pulse envelope types and the fixed test envelopes
//! - Inverted command-to-pulse interpolation with a defensive clamp
//! - The exact inverse pulse-to-percent map used for display
//! - The [`EscInterface`] output seam
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Platform-specific
//! PWM output (50 Hz servo-style pulse train) belongs to the implementor
//! of [`EscInterface`].

use libm::roundf;

/// Pulse envelope for the manually-driven knob test (µs).
pub const MANUAL_ENVELOPE: PulseEnvelope = PulseEnvelope {
    min_us: 1200,
    max_us: 1340,
};

/// Pulse envelope for the automated ramp test (µs).
pub const SWEEP_ENVELOPE: PulseEnvelope = PulseEnvelope {
    min_us: 1210,
    max_us: 1340,
};

/// Rest pulse commanded whenever a test ends or aborts (µs).
///
/// Sits above every test envelope: under the inverted convention it is
/// slower than the slowest test point, so parking here stops the motor.
pub const IDLE_PULSE_US: u16 = 1360;

/// Upper bound of the digitized throttle-knob reading (12-bit ADC).
pub const KNOB_RAW_MAX: u16 = 4095;

/// Digitized throttle-knob reader.
///
/// The analog sampling itself is external; the core only consumes the
/// already-digitized value in `0..=KNOB_RAW_MAX`.
pub trait ThrottleInput {
    /// Returns the current knob position as a raw ADC count.
    fn read_raw(&mut self) -> u16;
}

/// Speed-controller output seam.
///
/// Accepts a pulse width in microseconds. Writes are infallible by
/// design: the rig has no failure path for actuator commands.
pub trait EscInterface {
    /// Commands the given pulse width.
    fn write_pulse_us(&mut self, pulse_us: u16);
}

/// Closed pulse range a test mode is allowed to command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEnvelope {
    /// Shortest allowed pulse (fastest speed) in µs
    pub min_us: u16,
    /// Longest allowed pulse (slowest speed) in µs
    pub max_us: u16,
}

impl PulseEnvelope {
    /// Width of the envelope in µs.
    pub const fn span_us(&self) -> u16 {
        self.max_us - self.min_us
    }

    /// Clamps a pulse into the envelope.
    pub fn clamp(&self, pulse_us: u16) -> u16 {
        pulse_us.clamp(self.min_us, self.max_us)
    }

    /// Returns `true` if the pulse lies inside the envelope.
    pub fn contains(&self, pulse_us: u16) -> bool {
        pulse_us >= self.min_us && pulse_us <= self.max_us
    }
}

/// Maps a commanded value onto the envelope, inverted.
///
/// The low end of the command range maps to `max_us` (slowest) and the
/// high end to `min_us` (fastest). The result is clamped into the
/// envelope even when the command strays outside its nominal range.
///
/// # Arguments
///
/// * `command` - Commanded value (knob reading or sweep position)
/// * `range_lo` / `range_hi` - Nominal command range, `range_lo < range_hi`
/// * `envelope` - Active pulse envelope
pub fn command_to_pulse(
    command: f32,
    range_lo: f32,
    range_hi: f32,
    envelope: PulseEnvelope,
) -> u16 {
    let fraction = (command - range_lo) / (range_hi - range_lo);
    let pulse = f32::from(envelope.max_us) - fraction * f32::from(envelope.span_us());
    // Saturating float-to-int cast, then the envelope clamp proper.
    envelope.clamp(roundf(pulse) as u16)
}

/// Maps a pulse back to a 0-100 throttle percentage for display.
///
/// Exact algebraic inverse of [`command_to_pulse`]: `max_us` reads as 0 %
/// and `min_us` as 100 %, so a round trip through both maps recovers the
/// original command's percentage within one unit of rounding.
pub fn pulse_to_percent(pulse_us: u16, envelope: PulseEnvelope) -> u8 {
    let clamped = envelope.clamp(pulse_us);
    let fraction = f32::from(envelope.max_us - clamped) / f32::from(envelope.span_us());
    roundf(fraction * 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_range_endpoints_invert() {
        // Knob low rests the motor (longest pulse), knob high runs it
        // flat out (shortest pulse).
        assert_eq!(
            command_to_pulse(0.0, 0.0, 4095.0, MANUAL_ENVELOPE),
            MANUAL_ENVELOPE.max_us
        );
        assert_eq!(
            command_to_pulse(4095.0, 0.0, 4095.0, MANUAL_ENVELOPE),
            MANUAL_ENVELOPE.min_us
        );
    }

    #[test]
    fn test_midpoint_command() {
        let pulse = command_to_pulse(2047.5, 0.0, 4095.0, MANUAL_ENVELOPE);
        assert_eq!(pulse, 1270);
    }

    #[test]
    fn test_pulse_always_inside_envelope() {
        for command in [-5000.0, -1.0, 0.0, 100.0, 2048.0, 4095.0, 4096.0, 99999.0] {
            let pulse = command_to_pulse(command, 0.0, 4095.0, SWEEP_ENVELOPE);
            assert!(
                SWEEP_ENVELOPE.contains(pulse),
                "command {} produced out-of-envelope pulse {}",
                command,
                pulse
            );
        }
    }

    #[test]
    fn test_percent_endpoints() {
        assert_eq!(pulse_to_percent(MANUAL_ENVELOPE.max_us, MANUAL_ENVELOPE), 0);
        assert_eq!(
            pulse_to_percent(MANUAL_ENVELOPE.min_us, MANUAL_ENVELOPE),
            100
        );
    }

    #[test]
    fn test_percent_clamps_out_of_envelope_pulse() {
        assert_eq!(pulse_to_percent(900, MANUAL_ENVELOPE), 100);
        assert_eq!(pulse_to_percent(2000, MANUAL_ENVELOPE), 0);
    }

    #[test]
    fn test_percent_round_trip_within_one_unit() {
        for raw in (0..=4095).step_by(15) {
            let pulse = command_to_pulse(f32::from(raw as u16), 0.0, 4095.0, MANUAL_ENVELOPE);
            let percent = i32::from(pulse_to_percent(pulse, MANUAL_ENVELOPE));
            let expected = roundf(f32::from(raw as u16) * 100.0 / 4095.0) as i32;
            assert!(
                (percent - expected).abs() <= 1,
                "raw {} -> pulse {} -> {}%, expected {}%",
                raw,
                pulse,
                percent,
                expected
            );
        }
    }

    #[test]
    fn test_envelope_span_and_clamp() {
        assert_eq!(MANUAL_ENVELOPE.span_us(), 140);
        assert_eq!(SWEEP_ENVELOPE.span_us(), 130);
        assert_eq!(SWEEP_ENVELOPE.clamp(1000), 1210);
        assert_eq!(SWEEP_ENVELOPE.clamp(1500), 1340);
        assert_eq!(SWEEP_ENVELOPE.clamp(1300), 1300);
    }

    #[test]
    fn test_idle_pulse_is_slower_than_every_envelope() {
        assert!(IDLE_PULSE_US > MANUAL_ENVELOPE.max_us);
        assert!(IDLE_PULSE_US > SWEEP_ENVELOPE.max_us);
    }
}
