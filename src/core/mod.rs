//! # Core Module
//!
//! Core domain types, configuration, and time capabilities for the
//! reminder daemon.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add clock module so scheduling math is testable at fixed instants
//! - 1.0.0: Initial creation with config module

pub mod clock;
pub mod config;

// Re-export commonly used items
pub use clock::{Clock, SystemClock};
pub use config::Config;
