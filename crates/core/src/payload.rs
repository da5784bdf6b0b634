//! Payload-capacity estimation
//!
//! Turns the peak single-motor thrust observed during a sweep into a
//! payload figure for the target airframe: total lift across all rotors,
//! the maximum all-up weight the required thrust-to-weight ratio allows,
//! and what remains after the bare frame.

/// Number of lift motors on the target airframe.
pub const ROTOR_COUNT: u32 = 4;

/// Bare frame weight of the target airframe (kg).
pub const FRAME_WEIGHT_KG: f32 = 0.500;

/// Minimum total-lift to all-up-weight ratio for controlled flight.
pub const THRUST_TO_WEIGHT_RATIO: f32 = 2.0;

/// Derived payload figures for one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadResult {
    /// Peak thrust scaled to the full rotor count (kg)
    pub total_thrust_kg: f32,
    /// Maximum all-up weight at the required ratio (kg)
    pub max_supported_weight_kg: f32,
    /// Payload margin after the bare frame (kg); negative when the rig
    /// as configured cannot lift its own frame at the required ratio
    pub payload_capacity_kg: f32,
}

/// Computes the payload estimate from a peak single-motor thrust.
///
/// No clamping: a negative payload capacity is a meaningful result and
/// is surfaced, not suppressed.
pub fn estimate(
    peak_thrust_kg: f32,
    rotor_count: u32,
    frame_weight_kg: f32,
    required_ratio: f32,
) -> PayloadResult {
    let total_thrust_kg = peak_thrust_kg * rotor_count as f32;
    let max_supported_weight_kg = total_thrust_kg / required_ratio;
    PayloadResult {
        total_thrust_kg,
        max_supported_weight_kg,
        payload_capacity_kg: max_supported_weight_kg - frame_weight_kg,
    }
}
