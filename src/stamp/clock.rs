// src/stamp/clock.rs

use std::fmt::Debug;
use std::time::SystemTime;

/// Source of "now" for stamp freshness decisions.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> SystemTime;
}

/// Wall-clock implementation used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
