// src/clock/mod.rs

//! Monotonic time source for the scheduler.
//!
//! Timestamps are nanoseconds since an arbitrary epoch chosen when the clock
//! is constructed. They are only comparable with other readings of the same
//! clock inside one process run.

use std::fmt::Debug;
use std::time::Instant;

pub mod manual;

pub use manual::ManualClock;

pub const NANOS_PER_MILLI: u64 = 1_000_000;
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Abstract monotonic clock.
pub trait Clock: Send + Sync + Debug {
    /// Current time in nanoseconds. Never decreases.
    fn now_nanos(&self) -> u64;
}

/// Clock backed by `std::time::Instant`, unaffected by wall-clock changes.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        // Saturates after ~584 years of uptime.
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}
