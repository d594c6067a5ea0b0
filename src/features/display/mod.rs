//! # Display Feature
//!
//! Surfaces that render a fired reminder. The scheduler talks to the
//! [`surfaces::DisplaySurface`] trait only; the daemon composes the
//! configured surfaces behind a fanout.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

pub mod surfaces;

pub use surfaces::{DisplaySurface, FanoutDisplay, IpcDisplay, LogDisplay};

#[cfg(test)]
pub use surfaces::test_support;
