//! Platform service seams shared across the core.
//!
//! The only ambient service the test sequence needs is time: timestamps
//! for the classifier and the welcome hold, blocking waits for the sweep
//! dwell and settle intervals. Everything else the rig touches (ESC,
//! load cell, button, knob, display, status log) has its seam next to
//! the component that owns it.
//!
//! [`MockTime`] ships with the trait rather than behind a test gate, so
//! any crate driving the core gets deterministic time for free.

pub mod time;

pub use time::{MockTime, TimeSource};
