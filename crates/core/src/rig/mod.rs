//! Top-level rig control
//!
//! This module ties the components together:
//!
//! - `state`: rig state types and the pure transition table
//! - `screens`: operator screens for the character display
//! - `machine`: the tick-driven test state machine owning the rig context
//!
//! Every edge of the state machine is a row in [`state::transition`],
//! testable without driving the control loop.

mod machine;
mod screens;
mod state;

pub use machine::{
    RigIo, SweepReport, TestStateMachine, ABORT_NOTICE_MS, EXIT_SETTLE_MS, MANUAL_SAMPLE_MS,
    SWEEP_BANNER_MS, WELCOME_HOLD_MS,
};
pub use state::{transition, MenuSelection, RigAction, RigEvent, RigState, Transition};
