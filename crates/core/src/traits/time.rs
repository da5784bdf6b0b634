//! Time abstraction for platform-agnostic timing operations.
//!
//! The rig's control flow is tick-driven with a handful of fixed blocking
//! waits (debounce lockout, inter-step dwell, mid-sweep settle hold). Both
//! concerns go through the `TimeSource` trait so that the whole test
//! sequence runs deterministically under a mock clock on host.

use core::cell::Cell;

/// Platform-agnostic time source for the rig's control loop.
///
/// Implementations:
/// - A hardware timer wrapper on embedded targets
/// - [`MockTime`] for host testing with controllable time
/// - The simulator's virtual clock (free-running)
///
/// `delay_ms` is a *blocking* wait: the control loop owns the only logical
/// thread, and the fixed waits of the test sequence (dwell, settle hold)
/// intentionally monopolize it. Mock implementations advance virtual time
/// instantly instead of sleeping.
pub trait TimeSource {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Blocks for the given number of milliseconds.
    fn delay_ms(&self, ms: u32);

    /// Returns elapsed time in milliseconds since a reference point.
    ///
    /// Uses saturating subtraction so a reference in the "future" reads
    /// as zero elapsed rather than wrapping.
    fn elapsed_since_ms(&self, reference_ms: u64) -> u64 {
        self.now_ms().saturating_sub(reference_ms)
    }
}

impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source with controllable time advancement.
///
/// `delay_ms` advances the virtual clock instantly, so timing-dependent
/// sequences (sweep dwell, settle hold) run to completion in microseconds
/// of wall time while observing consistent timestamps.
///
/// # Example
///
/// ```
/// use thrust_stand_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_ms(), 0);
///
/// time.advance(1500);
/// assert_eq!(time.now_ms(), 1500);
///
/// time.delay_ms(500);
/// assert_eq!(time.now_ms(), 2000);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_ms: Cell<u64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(ms: u64) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(5_000);
        assert_eq!(time.now_ms(), 5_000);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTime::new();
        time.set(1_000);
        assert_eq!(time.now_ms(), 1_000);

        time.advance(500);
        assert_eq!(time.now_ms(), 1_500);
    }

    #[test]
    fn mock_time_delay_advances() {
        let time = MockTime::new();
        time.delay_ms(2_000);
        assert_eq!(time.now_ms(), 2_000);

        time.delay_ms(0);
        assert_eq!(time.now_ms(), 2_000);
    }

    #[test]
    fn mock_time_elapsed_since() {
        let time = MockTime::new();
        time.set(10_000);
        assert_eq!(time.elapsed_since_ms(3_000), 7_000);
    }

    #[test]
    fn mock_time_elapsed_since_saturates() {
        let time = MockTime::new();
        time.set(1_000);

        // Reference is in the "future" - should saturate to 0
        assert_eq!(time.elapsed_since_ms(5_000), 0);
    }
}
