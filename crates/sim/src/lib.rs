//! thrust_stand_sim - Bench-in-the-loop simulator for the thrust stand core
//!
//! Host-side implementations of every platform seam the core defines:
//! a shared virtual clock, a simulated ESC coupled to a motor/load-cell
//! model, a scripted push-button and throttle knob, an in-memory 20x4
//! character display, and status sinks. Plus the one-shot startup
//! calibration routine the hardware rig runs before its first tick.
//!
//! Together these let complete bench sessions (menu, manual test,
//! automated sweep, payload report) run deterministically in
//! microseconds of wall time.

pub mod bench;
pub mod calibration;
pub mod clock;
pub mod error;

pub use bench::{
    CapturedStatus, ConsoleStatus, MotorModel, ScriptedButton, ScriptedKnob, SimEsc, SimLoadCell,
    TextDisplay,
};
pub use calibration::{calibrate, CORRECTION_K, REFERENCE_WEIGHT_KG};
pub use clock::SimClock;
pub use error::CalibrationError;
