//! Operator screens for the 20x4 character display
//!
//! Rendering helpers for each rig state. Value fields are padded with
//! trailing blanks so a shorter value overwrites the previous one
//! without a full clear.

use core::fmt::Write as _;

use heapless::String;

use crate::display::DisplaySink;
use crate::payload::PayloadResult;

use super::state::MenuSelection;

type Line = String<20>;

pub fn welcome<D: DisplaySink>(display: &mut D) {
    display.clear();
    display.write_at(0, 1, "Motor Thrust Stand");
}

pub fn menu<D: DisplaySink>(display: &mut D, selection: MenuSelection) {
    display.clear();
    display.write_at(0, 0, "Choose option:");

    let manual_marker = if selection == MenuSelection::ManualTest {
        "> "
    } else {
        "  "
    };
    let algo_marker = if selection == MenuSelection::AlgorithmTest {
        "> "
    } else {
        "  "
    };

    let mut line = Line::new();
    let _ = write!(line, "{}1) Manual test", manual_marker);
    display.write_at(0, 1, &line);

    line.clear();
    let _ = write!(line, "{}2) Algorithm test", algo_marker);
    display.write_at(0, 2, &line);
}

pub fn manual_labels<D: DisplaySink>(display: &mut D) {
    display.clear();
    display.write_at(0, 0, "Throttle:");
    display.write_at(0, 2, "Thrust:");
}

pub fn manual_reading<D: DisplaySink>(display: &mut D, throttle_percent: u8, thrust_kg: f32) {
    let mut line = Line::new();
    let _ = write!(line, "{}%  ", throttle_percent);
    display.write_at(0, 1, &line);

    line.clear();
    let _ = write!(line, "{:.3} kg   ", thrust_kg);
    display.write_at(0, 3, &line);
}

pub fn sweep_starting<D: DisplaySink>(display: &mut D) {
    display.clear();
    display.write_at(0, 0, "Algorithm Test");
    display.write_at(0, 1, "Starting...");
}

pub fn sweep_running<D: DisplaySink>(display: &mut D) {
    display.clear();
    display.write_at(0, 0, "Processing...");
}

pub fn sweep_progress<D: DisplaySink>(display: &mut D, progress_percent: u8, thrust_kg: f32) {
    let mut line = Line::new();
    let _ = write!(line, "Progress: {}%   ", progress_percent);
    display.write_at(0, 1, &line);

    line.clear();
    let _ = write!(line, "Thrust: {:.3} kg   ", thrust_kg);
    display.write_at(0, 2, &line);
}

pub fn aborting<D: DisplaySink>(display: &mut D) {
    display.clear();
    display.write_at(0, 1, "Aborting...");
}

pub fn report<D: DisplaySink>(display: &mut D, peak_thrust_kg: f32, result: &PayloadResult) {
    display.clear();
    display.write_at(0, 0, "Test Complete!");

    let mut line = Line::new();
    let _ = write!(line, "Max thrust: {:.2}kg", peak_thrust_kg);
    display.write_at(0, 1, &line);

    line.clear();
    let _ = write!(line, "UAV thrust: {:.2}kg", result.total_thrust_kg);
    display.write_at(0, 2, &line);

    line.clear();
    let _ = write!(line, "Payload: {:.2}kg", result.payload_capacity_kg);
    display.write_at(0, 3, &line);
}
