//! Weighing sensor abstraction and thrust sampling
//!
//! The load cell sits behind an amplifier that exposes a readiness
//! predicate and a blocking averaged read in raw sensor units. The core
//! folds one read into a corrected weight-in-kilograms value; averaging
//! and filtering are the sensor driver's concern.
//!
//! A sensor that is momentarily not ready contributes a zero sample
//! instead of blocking or retrying. A wedged sensor therefore degrades a
//! test run to zero thrust readings rather than hanging the control loop.

/// Weighing sensor seam (HX711-style amplifier).
pub trait WeightSensor {
    /// Returns `true` when a conversion is available to read.
    fn is_ready(&mut self) -> bool;

    /// Blocking averaged read in scaled sensor units.
    ///
    /// Only called when [`is_ready`](WeightSensor::is_ready) returned
    /// `true`; the driver is expected to average several raw conversions
    /// internally.
    fn read_units(&mut self) -> f32;
}

/// Rig correction factor fixing sensor units into physical kilograms.
///
/// Produced once by the startup calibration routine (tare, averaged read
/// at a known reference weight, scale-factor derivation) and read-only
/// for the remainder of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Multiplier applied to every sensor reading
    pub correction_factor: f32,
}

impl Calibration {
    pub const fn new(correction_factor: f32) -> Self {
        Self { correction_factor }
    }
}

/// Takes one corrected thrust sample in kilograms.
///
/// Returns 0.0 without touching the reader when the sensor is not ready.
pub fn sample_kg<S: WeightSensor>(sensor: &mut S, calibration: &Calibration) -> f32 {
    if !sensor.is_ready() {
        return 0.0;
    }
    sensor.read_units() * calibration.correction_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSensor {
        ready: bool,
        units: f32,
        reads: u32,
    }

    impl WeightSensor for FakeSensor {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn read_units(&mut self) -> f32 {
            self.reads += 1;
            self.units
        }
    }

    #[test]
    fn test_sample_applies_correction() {
        let mut sensor = FakeSensor {
            ready: true,
            units: 0.750,
            reads: 0,
        };
        let calibration = Calibration::new(2.0);

        let kg = sample_kg(&mut sensor, &calibration);
        assert!((kg - 1.5).abs() < 1e-6);
        assert_eq!(sensor.reads, 1);
    }

    #[test]
    fn test_not_ready_samples_zero_without_reading() {
        let mut sensor = FakeSensor {
            ready: false,
            units: 0.750,
            reads: 0,
        };
        let calibration = Calibration::new(2.0);

        assert_eq!(sample_kg(&mut sensor, &calibration), 0.0);
        assert_eq!(sensor.reads, 0);
    }

    #[test]
    fn test_negative_reading_passes_through() {
        // A tare drift below zero is reported as-is; the rig does not
        // clamp individual samples.
        let mut sensor = FakeSensor {
            ready: true,
            units: -0.010,
            reads: 0,
        };
        let calibration = Calibration::new(3.265);

        assert!(sample_kg(&mut sensor, &calibration) < 0.0);
    }
}
