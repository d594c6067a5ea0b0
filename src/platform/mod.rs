//! # Platform Module
//!
//! Wrappers over host scheduling primitives. The rest of the crate talks
//! to the [`alarms::AlarmScheduler`] trait only, so tests can swap in an
//! in-memory fake.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod alarms;

pub use alarms::{AlarmFired, AlarmSchedule, AlarmScheduler, TokioAlarms};
