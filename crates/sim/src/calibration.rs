//! One-shot startup calibration.
//!
//! The hardware rig runs this once during bring-up, before the state
//! machine's first tick: zero the load cell, read the raw average with a
//! known reference weight on the cradle, derive the units-per-kilogram
//! scale factor, and hand the core its fixed correction factor. The
//! core treats the result as an opaque read-only input.

use thrust_stand_core::scale::{Calibration, WeightSensor};

use crate::bench::SimLoadCell;
use crate::error::CalibrationError;

/// Known reference weight placed on the cradle during calibration (kg).
pub const REFERENCE_WEIGHT_KG: f32 = 0.800;

/// Fixed rig correction applied on top of the derived scale factor.
pub const CORRECTION_K: f32 = 3.265;

/// Raw conversions averaged for the reference read.
const REFERENCE_SAMPLES: u32 = 20;

/// Readiness polls before giving up on the amplifier.
const READY_ATTEMPTS: u32 = 50;

/// Calibrates the bench's load cell.
///
/// Tares at no load, averages a raw read with the reference weight
/// placed on the cradle, and programs the derived scale factor into the
/// sensor so its unit reads come out in kilograms. Returns the rig's
/// correction factor for the core.
pub fn calibrate(cell: &mut SimLoadCell) -> Result<Calibration, CalibrationError> {
    wait_ready(cell)?;
    cell.tare();

    cell.place_reference(REFERENCE_WEIGHT_KG);
    let raw_units = cell.read_average_raw(REFERENCE_SAMPLES);
    cell.remove_reference();

    if raw_units <= 0.0 {
        return Err(CalibrationError::BadReferenceReading {
            raw_units,
            expected_kg: REFERENCE_WEIGHT_KG,
        });
    }

    cell.set_scale(raw_units / REFERENCE_WEIGHT_KG);
    Ok(Calibration::new(CORRECTION_K))
}

fn wait_ready(cell: &mut SimLoadCell) -> Result<(), CalibrationError> {
    for _ in 0..READY_ATTEMPTS {
        if cell.is_ready() {
            return Ok(());
        }
    }
    Err(CalibrationError::SensorNotReady {
        attempts: READY_ATTEMPTS,
    })
}
