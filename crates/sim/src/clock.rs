//! Virtual bench clock.
//!
//! Free-running simulated time: delays advance the clock instantly, so
//! a full sweep (nearly a minute of bench time) completes immediately
//! while every component observes consistent timestamps. Clones share
//! the same underlying instant.

use std::cell::Cell;
use std::rc::Rc;

use thrust_stand_core::traits::TimeSource;

/// Shared virtual clock implementing the core's [`TimeSource`].
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: Rc<Cell<u64>>,
}

impl SimClock {
    /// Creates a clock at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances simulated time.
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Jumps to an absolute simulated time.
    pub fn set(&self, ms: u64) {
        self.now_ms.set(ms);
    }
}

impl TimeSource for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(u64::from(ms));
    }
}
