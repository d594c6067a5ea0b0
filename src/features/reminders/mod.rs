//! # Reminders Feature
//!
//! Scheduled verse reminder system with quiet-hours suppression.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod scheduler;
pub mod settings;

pub use scheduler::{ReminderScheduler, CUSTOM_ALARM_PREFIX, INTERVAL_ALARM};
pub use settings::{
    is_quiet_time, next_occurrence, parse_clock_time, NotificationSettings, ReminderMode,
    SettingsParseError,
};
