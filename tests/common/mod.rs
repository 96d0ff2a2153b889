#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use headless_host::clock::{Clock, ManualClock, MonotonicClock};
use headless_host::sched::{HostContext, Scheduler};

pub use headless_host_test_utils::{Recorder, init_tracing, wait_until};

pub const MS: u64 = 1_000_000;

/// Context on the real clock, bound to the calling thread.
pub fn real_context() -> Arc<HostContext> {
    HostContext::new(Arc::new(MonotonicClock::new()))
}

/// Context on a manual clock, bound to the calling thread.
pub fn manual_context(start_nanos: u64) -> (Arc<HostContext>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_nanos));
    let context = HostContext::new(Arc::clone(&clock) as Arc<dyn Clock>);
    (context, clock)
}

pub fn scheduler(context: &Arc<HostContext>) -> Scheduler {
    Scheduler::with_idle_quantum(Arc::clone(context), Duration::from_millis(5))
}
