//! # Features Module
//!
//! Feature modules of the reminder daemon.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod corpus;
pub mod display;
pub mod reminders;

pub use corpus::{Corpus, CorpusError, PayloadKind, ReminderPayload};
pub use display::{DisplaySurface, FanoutDisplay, IpcDisplay, LogDisplay};
pub use reminders::{NotificationSettings, ReminderMode, ReminderScheduler};
