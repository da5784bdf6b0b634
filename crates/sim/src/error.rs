/// Errors from the startup calibration routine.
///
/// Calibration is the one bring-up step that can genuinely fail on the
/// bench (an unplugged amplifier, a missing reference weight); the core
/// itself never sees these, it only receives the finished factor.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("load cell not ready after {attempts} polls")]
    SensorNotReady { attempts: u32 },

    #[error("reference read of {raw_units} counts is unusable; is the {expected_kg} kg weight on the cradle?")]
    BadReferenceReading { raw_units: f32, expected_kg: f32 },
}
