//! Push-button input classification
//!
//! The rig is operated through a single push-button: a short press cycles
//! the menu selection, a long press confirms a selection or aborts a
//! running test. This module turns the raw sampled level into discrete
//! [`ButtonEvent`]s with debouncing and a once-per-hold long-press latch.
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Sampling the
//! physical pin (active-low, pulled up) is the platform's concern; the
//! classifier consumes an already-translated "pressed" level plus a
//! timestamp, so it is fully deterministic under a mock clock.

/// Hold duration at or above which a press is classified as long (ms).
pub const LONG_PRESS_MS: u64 = 3000;

/// Lockout window after a level transition within which further level
/// changes are treated as contact bounce (ms).
pub const DEBOUNCE_MS: u64 = 50;

/// Raw button level provider.
///
/// Implementations translate the platform's pin polarity: the rig wires
/// the button active-low with a pull-up, so "low" reads as pressed.
pub trait ButtonInput {
    /// Returns `true` while the button is held down.
    fn is_pressed(&self) -> bool;
}

/// Discrete event produced by one classification call.
///
/// Events are produced at most once per call and are never buffered; a
/// caller that skips a tick skips whatever event would have fired on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// No event this tick
    None,
    /// Button released before the long-press threshold
    ShortPress,
    /// Button held past the long-press threshold (fires while still held)
    LongPress,
}

/// Debounced short/long-press classifier.
///
/// # Classification rules
///
/// - Released→pressed transition: records the press start, returns
///   [`ButtonEvent::None`] and opens the debounce lockout.
/// - Pressed→released transition: a release before [`LONG_PRESS_MS`]
///   emits [`ButtonEvent::ShortPress`]; the release of a long hold emits
///   nothing (the long-press already fired while held).
/// - Held for [`LONG_PRESS_MS`] or more (strict `>=`): emits
///   [`ButtonEvent::LongPress`] exactly once per hold.
/// - Any level observed within [`DEBOUNCE_MS`] of a recorded transition
///   is ignored as bounce, never treated as a new transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonClassifier {
    pressed: bool,
    press_started_ms: u64,
    long_press_fired: bool,
    ignore_until_ms: u64,
}

impl ButtonClassifier {
    /// Creates a classifier with the button assumed released.
    pub const fn new() -> Self {
        Self {
            pressed: false,
            press_started_ms: 0,
            long_press_fired: false,
            ignore_until_ms: 0,
        }
    }

    /// Returns `true` while a press is being tracked.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Classifies one sampled level at time `now_ms`.
    pub fn poll(&mut self, raw_pressed: bool, now_ms: u64) -> ButtonEvent {
        // Bounce lockout: levels inside the window are not transitions.
        if now_ms < self.ignore_until_ms {
            return ButtonEvent::None;
        }

        if raw_pressed && !self.pressed {
            self.pressed = true;
            self.press_started_ms = now_ms;
            self.long_press_fired = false;
            self.ignore_until_ms = now_ms + DEBOUNCE_MS;
            return ButtonEvent::None;
        }

        if !raw_pressed && self.pressed {
            self.pressed = false;
            self.ignore_until_ms = now_ms + DEBOUNCE_MS;
            let held_ms = now_ms - self.press_started_ms;
            if held_ms < LONG_PRESS_MS {
                return ButtonEvent::ShortPress;
            }
            // Release after a long hold: the event already fired while held.
            return ButtonEvent::None;
        }

        if raw_pressed
            && !self.long_press_fired
            && now_ms - self.press_started_ms >= LONG_PRESS_MS
        {
            self.long_press_fired = true;
            return ButtonEvent::LongPress;
        }

        ButtonEvent::None
    }
}
