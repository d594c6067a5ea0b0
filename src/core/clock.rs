//! # Clock
//!
//! Wall-clock capability. Scheduling math takes the current instant from a
//! `Clock` so tests can pin time to exact boundary cases.

use chrono::{DateTime, Local};

/// Source of the current local time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
